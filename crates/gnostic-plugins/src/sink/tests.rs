//! Unit tests for sink resolution and plugin file dispatch.

use std::fs;
use std::io::{self, Write};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

/// Writer that records every call so tests can prove nothing was written.
#[derive(Default)]
struct CountingWriter {
    calls: usize,
    bytes: Vec<u8>,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.calls += 1;
        Ok(())
    }
}

#[fixture]
fn scratch() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn files() -> Vec<File> {
    vec![File::new("a.go", "package a"), File::new("b.go", "package b")]
}

fn location(path: &Path) -> String {
    path.to_str().expect("utf-8 path").to_owned()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[rstest]
#[case::discard("!", Sink::Discard)]
#[case::stdout("-", Sink::PrimaryStream)]
#[case::stderr("=", Sink::DiagnosticStream)]
fn sentinels_resolve_to_fixed_sinks(#[case] raw: &str, #[case] expected: Sink) {
    assert_eq!(Sink::for_artifact(raw), expected);
    assert_eq!(Sink::for_plugin(raw), expected);
}

#[rstest]
fn artifact_location_on_existing_directory_is_directory(scratch: TempDir) {
    let sink = Sink::for_artifact(&location(scratch.path()));
    assert_eq!(sink, Sink::Directory(scratch.path().to_path_buf()));
}

#[rstest]
fn artifact_location_on_missing_path_is_file(scratch: TempDir) {
    let target = scratch.path().join("out.pb");
    assert_eq!(Sink::for_artifact(&location(&target)), Sink::File(target));
}

#[rstest]
fn plugin_location_on_missing_path_is_directory(scratch: TempDir) {
    let target = scratch.path().join("generated");
    assert_eq!(Sink::for_plugin(&location(&target)), Sink::Directory(target));
}

#[rstest]
fn plugin_location_on_existing_file_is_file(scratch: TempDir) {
    let target = scratch.path().join("taken");
    fs::write(&target, "x").expect("seed file");
    assert_eq!(Sink::for_plugin(&location(&target)), Sink::File(target));
}

#[rstest]
#[case::discard(Sink::Discard, false)]
#[case::stdout(Sink::PrimaryStream, true)]
#[case::stderr(Sink::DiagnosticStream, true)]
#[case::file(Sink::File(PathBuf::from("x")), false)]
fn stream_sinks_are_identified(#[case] sink: Sink, #[case] expected: bool) {
    assert_eq!(sink.is_stream(), expected);
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn discard_never_writes() {
    let mut primary = CountingWriter::default();
    let mut diagnostic = CountingWriter::default();
    Sink::Discard
        .write_plugin_files("gnostic-test", &files(), &mut primary, &mut diagnostic)
        .expect("discard succeeds");
    assert_eq!(primary.calls, 0);
    assert_eq!(diagnostic.calls, 0);
}

#[test]
fn primary_stream_receives_named_files_in_order() {
    let mut primary = CountingWriter::default();
    let mut diagnostic = CountingWriter::default();
    Sink::PrimaryStream
        .write_plugin_files("gnostic-test", &files(), &mut primary, &mut diagnostic)
        .expect("stream write");
    let text = String::from_utf8(primary.bytes).expect("utf-8");
    assert_eq!(
        text,
        "\n\na.go -------------------- \npackage a\n\nb.go -------------------- \npackage b"
    );
    assert!(diagnostic.bytes.is_empty());
}

#[rstest]
fn directory_sink_creates_directory_and_writes_files(scratch: TempDir) {
    let directory = scratch.path().join("nested").join("generated");
    Sink::Directory(directory.clone())
        .write_plugin_files("gnostic-test", &files(), &mut io::sink(), &mut io::sink())
        .expect("directory write");
    assert_eq!(
        fs::read_to_string(directory.join("a.go")).expect("a.go"),
        "package a"
    );
    assert_eq!(
        fs::read_to_string(directory.join("b.go")).expect("b.go"),
        "package b"
    );
}

#[rstest]
fn directory_sink_creates_parents_of_nested_names(scratch: TempDir) {
    let files = [File::new("pkg/models/pet.go", "package models")];
    Sink::Directory(scratch.path().to_path_buf())
        .write_plugin_files("gnostic-test", &files, &mut io::sink(), &mut io::sink())
        .expect("nested write");
    let written = scratch.path().join("pkg").join("models").join("pet.go");
    assert_eq!(
        fs::read_to_string(written).expect("pet.go"),
        "package models"
    );
}

#[rstest]
fn directory_sink_overwrites_existing_files(scratch: TempDir) {
    fs::write(scratch.path().join("a.go"), "stale").expect("seed file");
    Sink::Directory(scratch.path().to_path_buf())
        .write_plugin_files("gnostic-test", &files(), &mut io::sink(), &mut io::sink())
        .expect("overwrite");
    assert_eq!(
        fs::read_to_string(scratch.path().join("a.go")).expect("a.go"),
        "package a"
    );
}

#[rstest]
fn file_sink_refuses_plugin_output(scratch: TempDir) {
    let target = scratch.path().join("taken");
    fs::write(&target, "keep me").expect("seed file");
    let error = Sink::for_plugin(&location(&target))
        .write_plugin_files("gnostic-test", &files(), &mut io::sink(), &mut io::sink())
        .expect_err("conflict");
    assert!(matches!(error, PluginError::OutputConflict { ref path } if *path == target));
    assert_eq!(fs::read_to_string(&target).expect("unchanged"), "keep me");
}

#[rstest]
#[case::parent("../escape.go")]
#[case::nested_parent("a/../../escape.go")]
#[case::absolute("/tmp/escape.go")]
#[case::empty("")]
#[case::current(".")]
fn unsafe_names_are_rejected(scratch: TempDir, #[case] name: &str) {
    let files = [File::new(name, "x")];
    let error = Sink::Directory(scratch.path().join("out"))
        .write_plugin_files("gnostic-test", &files, &mut io::sink(), &mut io::sink())
        .expect_err("unsafe name");
    assert!(
        matches!(&error, PluginError::UnsafeFileName { name: rejected, .. } if rejected == name),
        "unexpected error: {error}"
    );
}
