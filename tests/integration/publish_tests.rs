use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chaparral::error::{ChaparralError, Result};
use chaparral::manifest::MARKETPLACE_PATH;
use chaparral::publish::{
    ChangeKind, GitCollaborator, PublishOutcome, check_freshness, diff_manifests, publish,
    write_manifests,
};

use crate::common::OrgFixture;

/// Records calls instead of touching git.
#[derive(Default)]
struct RecordingGit {
    calls: RefCell<Vec<(PathBuf, Vec<String>, String)>>,
    nothing_to_commit: bool,
}

impl GitCollaborator for RecordingGit {
    fn commit_and_push(&self, repo: &Path, paths: &[String], version: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((repo.to_path_buf(), paths.to_vec(), version.to_string()));
        if self.nothing_to_commit {
            Err(ChaparralError::NothingToCommit)
        } else {
            Ok(())
        }
    }

    fn remote_url(&self, _repo: &Path) -> Result<String> {
        Ok("https://example.com/acme/brand.git".to_string())
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

#[test]
fn diff_write_diff_reports_modified() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    fixture.add_skill("linter", "Lints code");
    let org = fixture.org();
    let skills = fixture.skills();

    let first = diff_manifests(&org, &skills).unwrap();
    let paths: Vec<&str> = first.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "skills/linter/plugin.json",
            "skills/reviewer/plugin.json",
            MARKETPLACE_PATH
        ]
    );
    assert!(first.iter().all(|c| c.kind == ChangeKind::New));

    // diffing is read-only and repeatable
    assert_eq!(diff_manifests(&org, &skills).unwrap(), first);

    write_manifests(&org, &skills).unwrap().into_result().unwrap();

    let second = diff_manifests(&org, &skills).unwrap();
    assert_eq!(second.len(), 3);
    assert!(second.iter().all(|c| c.kind == ChangeKind::Modified));
    assert!(second[0].new_content.contains("\"0.1.1\""));
    assert!(second[0].old_content.contains("\"0.1.0\""));
}

#[test]
fn write_reports_is_new() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    let org = fixture.org();
    let skills = fixture.skills();

    let first = write_manifests(&org, &skills).unwrap().into_result().unwrap();
    assert!(first.iter().all(|f| f.is_new));

    let second = write_manifests(&org, &skills).unwrap().into_result().unwrap();
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|f| !f.is_new));

    let marketplace = fixture.read_json(Path::new("brand").join(MARKETPLACE_PATH));
    assert_eq!(marketplace["name"], "acme");
    assert_eq!(marketplace["plugins"][0]["source"], "./skills/reviewer");
    assert_eq!(marketplace["plugins"][0]["version"], "0.1.1");
}

#[test]
fn foreign_plugin_json_is_left_alone() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    let custom = fixture.add_skill("custom", "Hand maintained");
    let hand_written = "{\n  \"name\": \"custom\",\n  \"version\": \"7.0.0\"\n}\n";
    fs::write(custom.join("plugin.json"), hand_written).unwrap();

    let org = fixture.org();
    let skills = fixture.skills();

    let changes = diff_manifests(&org, &skills).unwrap();
    assert!(changes.iter().all(|c| !c.path.contains("custom")));

    write_manifests(&org, &skills).unwrap().into_result().unwrap();
    assert_eq!(
        fs::read_to_string(custom.join("plugin.json")).unwrap(),
        hand_written
    );
    let marketplace = fixture.read_json(Path::new("brand").join(MARKETPLACE_PATH));
    let names: Vec<&str> = marketplace["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["reviewer"]);
}

#[test]
fn bad_frontmatter_aborts_before_writing() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    fixture.add_skill_raw("broken", "no frontmatter here\n");
    let org = fixture.org();
    let skills = fixture.skills();

    assert!(write_manifests(&org, &skills).is_err());
    assert!(!fixture.brand().join("skills/reviewer/plugin.json").exists());
    assert!(!fixture.brand().join(MARKETPLACE_PATH).exists());
}

#[test]
fn freshness_never_published_then_fresh_then_stale() {
    let fixture = OrgFixture::new("acme");
    let skill = fixture.add_skill("reviewer", "Reviews code");
    let org = fixture.org();
    let skills = fixture.skills();

    let before = check_freshness(&org, &skills).unwrap();
    assert!(before[0].stale);
    assert!(before[0].published_version.is_empty());

    let past = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&skill.join("SKILL.md"), past);
    write_manifests(&org, &skills).unwrap().into_result().unwrap();

    let after = check_freshness(&org, &skills).unwrap();
    assert!(!after[0].stale);
    assert_eq!(after[0].published_version, "0.1.0");

    let nested = skill.join("references/guide.md");
    fs::create_dir_all(nested.parent().unwrap()).unwrap();
    fs::write(&nested, "more detail").unwrap();
    set_mtime(&nested, SystemTime::now() + Duration::from_secs(3600));

    let edited = check_freshness(&org, &skills).unwrap();
    assert!(edited[0].stale);
    assert_eq!(edited[0].published_version, "0.1.0");
}

#[test]
fn publish_commits_written_paths() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    let org = fixture.org();
    let skills = fixture.skills();
    let git = RecordingGit::default();

    let outcome = publish(&org, &skills, &git).unwrap();
    let PublishOutcome::Published { version, written } = outcome else {
        panic!("expected a publish, got {outcome:?}");
    };
    assert_eq!(version, "0.1.0");
    assert_eq!(written.len(), 2);

    let calls = git.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, fixture.brand());
    assert_eq!(
        calls[0].1,
        vec![
            "skills/reviewer/plugin.json".to_string(),
            MARKETPLACE_PATH.to_string()
        ]
    );
    assert_eq!(calls[0].2, "0.1.0");
}

#[test]
fn publish_maps_nothing_to_commit() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    let git = RecordingGit {
        nothing_to_commit: true,
        ..RecordingGit::default()
    };

    let outcome = publish(&fixture.org(), &fixture.skills(), &git).unwrap();
    assert!(matches!(outcome, PublishOutcome::NothingToCommit { .. }));
}

#[test]
fn publish_without_skills_only_touches_marketplace() {
    let fixture = OrgFixture::new("acme");
    let git = RecordingGit::default();

    let first = publish(&fixture.org(), &[], &git).unwrap();
    assert!(matches!(first, PublishOutcome::Published { .. }));

    // an empty catalog regenerates identically, so the second run is a no-op
    let second = publish(&fixture.org(), &[], &git).unwrap();
    assert_eq!(second, PublishOutcome::UpToDate);
    assert_eq!(git.calls.borrow().len(), 1);
}

#[test]
fn non_utf8_plugin_json_is_treated_as_foreign() {
    let fixture = OrgFixture::new("acme");
    let custom = fixture.add_skill("custom", "Hand maintained");
    fixture.add_skill("reviewer", "Reviews code");
    let garbage = [0xff, 0xfe, b'{'];
    fs::write(custom.join("plugin.json"), garbage).unwrap();

    let org = fixture.org();
    let skills = fixture.skills();

    let changes = diff_manifests(&org, &skills).unwrap();
    let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["skills/reviewer/plugin.json", MARKETPLACE_PATH]);

    write_manifests(&org, &skills).unwrap().into_result().unwrap();
    assert_eq!(fs::read(custom.join("plugin.json")).unwrap(), garbage);
}

#[test]
fn non_utf8_marketplace_is_modified() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    let marketplace = fixture.brand().join(MARKETPLACE_PATH);
    fs::create_dir_all(marketplace.parent().unwrap()).unwrap();
    fs::write(&marketplace, [0xff, 0xfe, b'{']).unwrap();

    let changes = diff_manifests(&fixture.org(), &fixture.skills()).unwrap();
    let last = changes.last().unwrap();
    assert_eq!(last.path, MARKETPLACE_PATH);
    assert_eq!(last.kind, ChangeKind::Modified);
}

/// A dangling symlink into a missing directory reads as absent but can't be
/// written through.
#[cfg(unix)]
fn break_destination(fixture: &OrgFixture, path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(fixture.temp_dir.path().join("missing/target"), path).unwrap();
}

#[cfg(unix)]
#[test]
fn failed_write_does_not_stop_later_files() {
    let fixture = OrgFixture::new("acme");
    let alpha = fixture.add_skill("alpha", "First");
    fixture.add_skill("beta", "Second");
    break_destination(&fixture, &alpha.join("plugin.json"));
    break_destination(&fixture, &fixture.brand().join(MARKETPLACE_PATH));

    let outcome = write_manifests(&fixture.org(), &fixture.skills()).unwrap();
    let paths: Vec<&str> = outcome.written.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["skills/beta/plugin.json"]);
    assert!(fixture.brand().join("skills/beta/plugin.json").is_file());

    // the first failure is the one kept
    let error = outcome.error.as_ref().unwrap().to_string();
    assert!(error.contains("alpha"), "{error}");

    let err = outcome.into_result().unwrap_err();
    let ChaparralError::PartialWrite { written, .. } = &err else {
        panic!("expected a partial write, got {err:?}");
    };
    assert_eq!(written, &vec!["skills/beta/plugin.json".to_string()]);
    assert_eq!(err.code(), "io");
    assert!(err.to_string().contains("already written: skills/beta/plugin.json"));
}

#[cfg(unix)]
#[test]
fn publish_reports_files_written_before_a_failure() {
    let fixture = OrgFixture::new("acme");
    fixture.add_skill("reviewer", "Reviews code");
    break_destination(&fixture, &fixture.brand().join(MARKETPLACE_PATH));
    let git = RecordingGit::default();

    let err = publish(&fixture.org(), &fixture.skills(), &git).unwrap_err();
    assert!(
        matches!(&err, ChaparralError::PartialWrite { written, .. } if written == &vec!["skills/reviewer/plugin.json".to_string()])
    );
    assert!(git.calls.borrow().is_empty());
}
