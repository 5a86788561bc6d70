//! Helpers for building real git repositories in temporary directories

#![allow(dead_code)]

use git2::{Commit, IndexAddOption, Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// An upstream repository and a clone whose `origin` points at it
pub struct Fixture {
    pub upstream: TempDir,
    pub clone: TempDir,
    /// Commit tagged `v1.0`
    pub v1: Oid,
    /// Commit tagged `v2.0`, the upstream HEAD at clone time
    pub v2: Oid,
}

impl Fixture {
    pub fn upstream_repo(&self) -> Repository {
        Repository::open(self.upstream.path()).unwrap()
    }

    pub fn clone_repo(&self) -> Repository {
        Repository::open(self.clone.path()).unwrap()
    }

    pub fn clone_path(&self) -> &Path {
        self.clone.path()
    }

    /// Write `.git/info/sparse-checkout` in the clone
    pub fn write_sparse_spec(&self, content: &str) {
        let info = self.clone.path().join(".git/info");
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join("sparse-checkout"), content).unwrap();
    }
}

pub fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@test.com").unwrap()
}

/// Write `files` into the working directory and commit everything on HEAD
pub fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    for (path, content) in files {
        let full_path = workdir.join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(&full_path, content).unwrap();
    }

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parents: Vec<Commit<'_>> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Create an annotated tag
pub fn annotated_tag(repo: &Repository, name: &str, commit: Oid) -> Oid {
    let object = repo.find_object(commit, None).unwrap();
    repo.tag(name, &object, &signature(), &format!("Release {name}"), false)
        .unwrap()
}

/// Create a lightweight tag
pub fn lightweight_tag(repo: &Repository, name: &str, commit: Oid) -> Oid {
    let object = repo.find_object(commit, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap()
}

/// Upstream with two tagged releases, cloned into a second directory
///
/// `v1.0` holds `first/a.txt`, `second/b.txt` and `third.txt`; `v2.0` adds
/// `fourth.txt`.
pub fn fixture() -> Fixture {
    let upstream = TempDir::new().unwrap();
    let repo = Repository::init(upstream.path()).unwrap();

    let v1 = commit_files(
        &repo,
        &[
            ("first/a.txt", "a"),
            ("second/b.txt", "b"),
            ("third.txt", "c"),
        ],
        "First release",
    );
    annotated_tag(&repo, "v1.0", v1);

    let v2 = commit_files(&repo, &[("fourth.txt", "d")], "Second release");
    annotated_tag(&repo, "v2.0", v2);

    let clone = TempDir::new().unwrap();
    Repository::clone(upstream.path().to_str().unwrap(), clone.path()).unwrap();

    Fixture {
        upstream,
        clone,
        v1,
        v2,
    }
}

/// Sorted names of the top-level entries of `dir`
pub fn top_level_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
