use super::*;
use futures_util::TryStreamExt;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn fixture() -> (tempfile::TempDir, Filesystem) {
    let root = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(root.path());
    (root, fs)
}

#[test]
fn fs_relative_paths() {
    let (_root, mut fs) = fixture();
    assert_eq!(fs.relative("foo/bar"), "foo/bar");
    assert_eq!(fs.relative("/foo/bar/"), "foo/bar");
    assert_eq!(fs.relative("\\foo\\bar"), "foo/bar");
    assert_eq!(fs.relative("C:\\foo"), "foo");

    fs.cwd = "a/b".to_string();
    assert_eq!(fs.relative("c"), "a/b/c");
    assert_eq!(fs.relative("../c"), "a/c");
    assert_eq!(fs.relative("/c"), "c");
    assert_eq!(fs.relative("./c/./d"), "a/b/c/d");
}

#[test]
fn fs_resolve_never_escapes_root() {
    let (root, mut fs) = fixture();
    fs.cwd = "deep/er".to_string();
    for path in ["..", "../..", "../../..", "/../../etc/passwd", "a/../../../../b", "..\\..\\..\\x", "/./../.."] {
        let resolved = fs.resolve(path).unwrap();
        assert!(resolved.starts_with(root.path()), "{} resolved to {:?}", path, resolved);
    }
    assert_eq!(fs.resolve("/../../etc/passwd").unwrap(), root.path().join("etc/passwd"));
    assert_eq!(fs.resolve("/").unwrap(), root.path());
}

#[tokio::test]
async fn fs_chdir_and_pwd() {
    let (root, mut fs) = fixture();
    std::fs::create_dir_all(root.path().join("pub/incoming")).unwrap();

    assert_eq!(fs.pwd(), "/");
    assert_eq!(fs.chdir("pub").await.unwrap(), "/pub");
    assert_eq!(fs.chdir("incoming").await.unwrap(), "/pub/incoming");
    assert_eq!(fs.chdir("..").await.unwrap(), "/pub");
    assert_eq!(fs.chdir("/").await.unwrap(), "/");
    assert_eq!(fs.chdir("..").await.unwrap(), "/");
}

#[tokio::test]
async fn fs_chdir_autocreates() {
    let (root, mut fs) = fixture();
    assert_eq!(fs.chdir("x/y").await.unwrap(), "/x/y");
    assert!(root.path().join("x/y").is_dir());
}

#[tokio::test]
async fn fs_chdir_without_autocreate() {
    let (root, fs) = fixture();
    let mut fs = fs.autocreate_directories(false);
    let err = fs.chdir("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchDirectory);
    assert_eq!(err.code(), 431);
    assert_eq!(fs.pwd(), "/");
    assert!(!root.path().join("missing").exists());
}

#[tokio::test]
async fn fs_chdir_into_file_fails() {
    let (root, mut fs) = fixture();
    std::fs::write(root.path().join("file.txt"), b"x").unwrap();
    let err = fs.chdir("file.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchDirectory);
}

#[tokio::test]
async fn fs_mkdir_creates_the_chain_and_is_idempotent() {
    let (root, fs) = fixture();
    fs.mkdir("a/b/c").await.unwrap();
    assert!(root.path().join("a/b/c").is_dir());
    fs.mkdir("a/b/c").await.unwrap();
    fs.mkdir("/a/b/d").await.unwrap();
    assert!(root.path().join("a/b/d").is_dir());
}

#[tokio::test]
async fn fs_mkdir_through_a_file_fails() {
    let (root, fs) = fixture();
    std::fs::write(root.path().join("a"), b"x").unwrap();
    assert!(fs.mkdir("a/b").await.is_err());
}

#[tokio::test]
async fn fs_list() {
    let (root, fs) = fixture();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    std::fs::write(root.path().join("hello.txt"), b"hello world").unwrap();

    let mut lines: Vec<String> = fs.list("/").await.unwrap().try_collect().await.unwrap();
    lines.sort_by_key(|l| l.ends_with("sub\r\n"));

    assert_eq!(lines.len(), 2);
    let file = &lines[0];
    let dir = &lines[1];
    assert!(file.starts_with('-'));
    assert!(file.ends_with(" hello.txt\r\n"));
    assert_eq!(&file[10..34], "    1 ftp      ftp      ");
    assert_eq!(&file[34..42], "      11");
    assert!(dir.starts_with('d'));
    assert!(dir.ends_with(" sub\r\n"));
}

#[tokio::test]
async fn fs_list_empty_dir() {
    let (_root, fs) = fixture();
    let lines: Vec<String> = fs.list("").await.unwrap().try_collect().await.unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn fs_list_missing_dir() {
    let (_root, fs) = fixture();
    let err = fs.list("nope").await.err().unwrap();
    assert_eq!(err.code(), 431);
    assert_eq!(err.message(), "No such directory");
}

#[tokio::test]
async fn fs_list_on_a_file() {
    let (root, fs) = fixture();
    std::fs::write(root.path().join("file.txt"), b"x").unwrap();
    let err = fs.list("file.txt").await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NoSuchDirectory);
    assert_eq!(err.code(), 431);
}

#[tokio::test]
async fn fs_read_and_write() {
    let (root, fs) = fixture();
    let mut file = fs.write_file("data.bin").await.unwrap();
    file.write_all(b"payload").await.unwrap();
    file.flush().await.unwrap();
    drop(file);
    assert_eq!(std::fs::read(root.path().join("data.bin")).unwrap(), b"payload");

    let mut file = fs.read_file("/data.bin").await.unwrap();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await.unwrap();
    assert_eq!(buf, b"payload");
    assert_eq!(fs.size("data.bin").await.unwrap(), 7);
}

#[tokio::test]
async fn fs_write_truncates() {
    let (root, fs) = fixture();
    std::fs::write(root.path().join("old.txt"), b"a much longer content").unwrap();
    drop(fs.write_file("old.txt").await.unwrap());
    assert_eq!(std::fs::metadata(root.path().join("old.txt")).unwrap().len(), 0);
}

#[tokio::test]
async fn fs_read_file_rejects_directories_and_missing_files() {
    let (root, fs) = fixture();
    std::fs::create_dir(root.path().join("dir")).unwrap();
    assert_eq!(fs.read_file("dir").await.err().unwrap().kind(), ErrorKind::NoSuchFile);
    assert_eq!(fs.read_file("missing").await.err().unwrap().message(), "No such file");
}

#[tokio::test]
async fn fs_unlink_and_exists() {
    let (root, fs) = fixture();
    std::fs::write(root.path().join("gone.txt"), b"x").unwrap();
    assert!(fs.exists("gone.txt").await);
    fs.unlink("gone.txt").await.unwrap();
    assert!(!fs.exists("gone.txt").await);
    assert_eq!(fs.unlink("gone.txt").await.unwrap_err().code(), 550);
}

#[tokio::test]
async fn fs_rename_is_not_implemented() {
    let (root, fs) = fixture();
    std::fs::write(root.path().join("a.txt"), b"x").unwrap();
    let err = fs.rename("a.txt", "b.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    assert_eq!(err.code(), 431);
    assert!(root.path().join("a.txt").exists());
}
