//! Child process lifecycle: spawn, drain, poll, kill.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long to wait for the output reader after a timed-out child has been killed.
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// What happened to a spawned shell.
pub(crate) enum Completion {
    Exited { status: ExitStatus, captured: Vec<u8> },
    TimedOut,
}

type Reader = JoinHandle<io::Result<Vec<u8>>>;

/// Spawn `sh -c command` with stdout and stderr sharing one pipe, then wait for it.
pub(crate) fn run_shell(command: &str, timeout: Option<Duration>, poll_interval: Duration) -> io::Result<Completion> {
    let (mut pipe_reader, pipe_writer) = io::pipe()?;

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(pipe_writer.try_clone()?)
        .stderr(pipe_writer);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let mut child = cmd.spawn()?;
    // The command still holds our copies of the write end; EOF only arrives once they are closed.
    drop(cmd);

    let reader: Reader = thread::spawn(move || {
        let mut buf = Vec::new();
        pipe_reader.read_to_end(&mut buf)?;
        Ok(buf)
    });

    let Some(limit) = timeout else {
        let status = child.wait()?;
        let captured = join_reader(reader)?;
        return Ok(Completion::Exited { status, captured });
    };

    let started = Instant::now();
    let mut exited: Option<ExitStatus> = None;
    loop {
        if exited.is_none() {
            exited = child.try_wait()?;
        }
        // A backgrounded grandchild can keep the pipe open after the shell exits, so the
        // deadline covers draining the output as well.
        if let Some(status) = exited {
            if reader.is_finished() {
                let captured = join_reader(reader)?;
                return Ok(Completion::Exited { status, captured });
            }
        }
        if started.elapsed() > limit {
            tracing::warn!(pid = child.id(), elapsed_ms = started.elapsed().as_millis() as u64, "deadline exceeded; killing");
            terminate(&mut child);
            abandon_reader(reader);
            return Ok(Completion::TimedOut);
        }
        thread::sleep(poll_interval);
    }
}

fn join_reader(reader: Reader) -> io::Result<Vec<u8>> {
    reader
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))?
}

/// Give the reader a bounded chance to finish once its writers are dead, then let it go.
fn abandon_reader(reader: Reader) {
    let deadline = Instant::now() + READER_JOIN_TIMEOUT;
    while Instant::now() < deadline {
        if reader.is_finished() {
            let _ = reader.join();
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    tracing::warn!("output reader still blocked after kill; detaching");
}

/// Forcibly kill the child and everything it started, then reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    kill_process_group(child.id());

    if let Err(e) = child.kill() {
        // Already reaped or already dead.
        tracing::debug!(error = %e, "kill after group kill");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "failed to reap killed child");
    }
}

/// SIGKILL the process group led by `pgid` (the shell was spawned as a group leader).
#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        tracing::warn!(pgid, "process group id out of range; not signalled");
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => {}
        // Every member already exited.
        Err(Errno::ESRCH) => tracing::debug!(pgid, "process group already gone"),
        Err(e) => tracing::warn!(pgid, error = %e, "failed to kill process group"),
    }
}
