//! Configuration loading and merging tests

use std::path::PathBuf;
use tagsnap::cli::Args;
use tagsnap::config::Config;
use tagsnap::error::SnapError;
use tagsnap::git::{CheckoutStrategy, TagLookup};
use tagsnap::system::MockSystem;

fn args(repopath: &str, tag: &str) -> Args {
    Args {
        repopath: Some(repopath.to_owned()),
        tag: Some(tag.to_owned()),
        ..Args::default()
    }
}

fn snap_error(err: &anyhow::Error) -> &SnapError {
    err.downcast_ref::<SnapError>()
        .unwrap_or_else(|| panic!("not a SnapError: {err:#}"))
}

#[test]
fn test_defaults_from_flags_only() {
    let system = MockSystem::new().with_current_dir("/work").unwrap();

    let config = Config::from_args(&system, &args("/srv/app", "v1.0")).unwrap();

    assert_eq!(config, Config::new("/srv/app", "v1.0"));
    assert_eq!(config.remote, "origin");
    assert_eq!(
        config.refspecs,
        [
            "+refs/heads/*:refs/remotes/origin/*",
            "refs/tags/*:refs/tags/*"
        ]
    );
    assert!(config.trust_all_certificates);
    assert_eq!(config.checkout_strategy, CheckoutStrategy::Theirs);
    assert_eq!(config.tag_lookup, TagLookup::Scan);
    assert_eq!(config.ssh_path, PathBuf::new());
}

#[test]
fn test_default_config_file_in_current_dir() {
    let system = MockSystem::new()
        .with_current_dir("/work")
        .unwrap()
        .with_file(
            "/work/tagsnap.yaml",
            b"repoPath: /srv/app\n\
              tag: v2.0\n\
              remote: upstream\n\
              checkoutStrategy: safe\n\
              tagLookup: reference\n\
              trustAllCertificates: false\n",
        )
        .unwrap();

    let config = Config::from_args(&system, &Args::default()).unwrap();

    assert_eq!(config.repo_path, PathBuf::from("/srv/app"));
    assert_eq!(config.tag, "v2.0");
    assert_eq!(config.remote, "upstream");
    assert_eq!(
        config.refspecs,
        [
            "+refs/heads/*:refs/remotes/upstream/*",
            "refs/tags/*:refs/tags/*"
        ]
    );
    assert_eq!(config.checkout_strategy, CheckoutStrategy::Safe);
    assert_eq!(config.tag_lookup, TagLookup::Reference);
    assert!(!config.trust_all_certificates);
}

#[test]
fn test_flags_override_file() {
    let system = MockSystem::new()
        .with_file(
            "/etc/tagsnap/app.yaml",
            b"repoPath: /srv/app\ntag: v2.0\ncheckoutStrategy: safe\n",
        )
        .unwrap();

    let mut args = args("/srv/other", "v3.0");
    args.config = Some("/etc/tagsnap/app.yaml".to_owned());
    args.checkout_strategy = Some("force".to_owned());
    args.dry_run = true;
    args.quiet = true;

    let config = Config::from_args(&system, &args).unwrap();

    assert_eq!(config.repo_path, PathBuf::from("/srv/other"));
    assert_eq!(config.tag, "v3.0");
    assert_eq!(config.checkout_strategy, CheckoutStrategy::Force);
    assert!(config.dry_run);
    assert!(!config.show_progress);
}

#[test]
fn test_remote_flag_moves_default_refspecs() {
    let system = MockSystem::new();
    let mut args = args("/srv/app", "v1.0");
    args.remote = Some("mirror".to_owned());

    let config = Config::from_args(&system, &args).unwrap();

    assert_eq!(config.refspecs[0], "+refs/heads/*:refs/remotes/mirror/*");
    assert_eq!(config.refspecs[1], "refs/tags/*:refs/tags/*");
}

#[test]
fn test_explicit_refspecs_are_kept_with_remote() {
    let system = MockSystem::new()
        .with_file(
            "/work/tagsnap.yaml",
            b"remote: mirror\nrefspecs:\n  - \"refs/tags/*:refs/tags/*\"\n",
        )
        .unwrap()
        .with_current_dir("/work")
        .unwrap();

    let config = Config::from_args(&system, &args("/srv/app", "v1.0")).unwrap();

    assert_eq!(config.remote, "mirror");
    assert_eq!(config.refspecs, ["refs/tags/*:refs/tags/*"]);
}

#[test]
fn test_missing_config_file() {
    let system = MockSystem::new();
    let mut args = args("/srv/app", "v1.0");
    args.config = Some("/nonexistent.yaml".to_owned());

    let err = Config::from_args(&system, &args).unwrap_err();

    let err = snap_error(&err);
    assert!(matches!(err, SnapError::Configuration { .. }));
    assert!(err.to_string().contains("Configuration file not found"));
}

#[test]
fn test_missing_repo_path_and_tag() {
    let system = MockSystem::new();

    let err = Config::from_args(&system, &Args::default()).unwrap_err();
    assert!(snap_error(&err).to_string().contains("No repository path given"));

    let args = Args {
        repopath: Some("/srv/app".to_owned()),
        ..Args::default()
    };
    let err = Config::from_args(&system, &args).unwrap_err();
    assert!(snap_error(&err).to_string().contains("No tag given"));
    assert_eq!(snap_error(&err).exit_code(), 1);
}

#[test]
fn test_ssh_path_home_expansion() {
    let system = MockSystem::new().with_home("/home/deploy").unwrap();
    let mut args = args("/srv/app", "v1.0");
    args.sshpath = Some("~/.ssh/deploy".to_owned());

    let config = Config::from_args(&system, &args).unwrap();

    assert_eq!(config.ssh_path, PathBuf::from("/home/deploy/.ssh/deploy"));
    assert_eq!(
        config.credentials().public_key_path(),
        PathBuf::from("/home/deploy/.ssh/deploy/id_rsa.pub")
    );
}

#[test]
fn test_verify_certificates_flag() {
    let system = MockSystem::new();
    let mut args = args("/srv/app", "v1.0");
    args.verify_certificates = true;

    let config = Config::from_args(&system, &args).unwrap();

    assert!(!config.trust_all_certificates);
}

#[test]
fn test_invalid_tag_and_remote_rejected() {
    let system = MockSystem::new();

    let err = Config::from_args(&system, &args("/srv/app", "bad..tag")).unwrap_err();
    assert!(snap_error(&err).to_string().contains("Invalid tag name"));

    let mut bad_remote = args("/srv/app", "v1.0");
    bad_remote.remote = Some("-origin".to_owned());
    let err = Config::from_args(&system, &bad_remote).unwrap_err();
    assert!(snap_error(&err).to_string().contains("Invalid remote name"));
}

#[test]
fn test_unknown_config_key_rejected() {
    let system = MockSystem::new()
        .with_file("/work/tagsnap.yaml", b"repoPath: /srv/app\nbranch: main\n")
        .unwrap()
        .with_current_dir("/work")
        .unwrap();

    let result = Config::from_args(&system, &args("/srv/app", "v1.0"));

    assert!(result.is_err());
}

#[test]
fn test_empty_config_file_is_allowed() {
    let system = MockSystem::new()
        .with_file("/work/tagsnap.yaml", b"")
        .unwrap()
        .with_current_dir("/work")
        .unwrap();

    let config = Config::from_args(&system, &args("/srv/app", "v1.0")).unwrap();

    assert_eq!(config.tag, "v1.0");
}
