//! Fake course layout with shell-script toolchains
//!
//! ```text
//! <root>/examples/<case>.cl
//! <root>/assignments/PA4/{lexer,parser,semant}   candidate toolchain
//! <root>/reference/semant                        golden semant
//! ```
//!
//! The candidate `semant` rewrites `x` to `y` (so any case mentioning `x` fails) and hangs on sources
//! containing `HANG`. The lexer rejects sources containing `ERR` on both sides.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const LEXER: &str = r#"#!/bin/sh
if grep -q ERR "$1"; then
  echo "$1: lexical error" >&2
  exit 1
fi
cat "$1"
"#;

const PARSER: &str = "#!/bin/sh\ncat\n";

const CANDIDATE_SEMANT: &str = r#"#!/bin/sh
awk '/HANG/ { system("sleep 30") } { gsub(/x/, "y"); print }'
"#;

const REFERENCE_SEMANT: &str = "#!/bin/sh\ncat\n";

pub struct Course {
    pub dir: TempDir,
}

impl Course {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let course = Self { dir };
        fs::create_dir_all(course.examples()).unwrap();
        fs::create_dir_all(course.phase_dir()).unwrap();
        fs::create_dir_all(course.reference_dir()).unwrap();

        write_script(&course.phase_dir().join("lexer"), LEXER);
        write_script(&course.phase_dir().join("parser"), PARSER);
        write_script(&course.phase_dir().join("semant"), CANDIDATE_SEMANT);
        write_script(&course.reference_dir().join("semant"), REFERENCE_SEMANT);
        course
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn examples(&self) -> PathBuf {
        self.root().join("examples")
    }

    pub fn phase_dir(&self) -> PathBuf {
        self.root().join("assignments").join("PA4")
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.root().join("reference")
    }

    pub fn case_list(&self) -> PathBuf {
        self.root().join("case.list")
    }

    pub fn fail_log(&self) -> PathBuf {
        self.root().join("faillog.txt")
    }

    pub fn add_case(&self, id: &str, source: &str) {
        fs::write(self.examples().join(format!("{id}.cl")), source).unwrap();
    }

    pub fn write_case_list(&self, ids: &[&str]) {
        let mut text = ids.join("\n");
        text.push('\n');
        fs::write(self.case_list(), text).unwrap();
    }
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
