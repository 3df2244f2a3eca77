use std::fs;

use chaparral::core::discovery::find_orgs;
use chaparral::linker::{self, LinkAction, LinkState};

use crate::common::OrgFixture;

#[test]
fn discovers_org_and_sibling_repos() {
    let fixture = OrgFixture::new("acme");
    fixture.add_repo("widget");
    fixture.add_repo("gadget");
    fs::create_dir_all(fixture.org_path.join("notes")).unwrap();

    let orgs = find_orgs(&fixture.base).unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].name, "acme");
    assert_eq!(orgs[0].brand_repo, "brand");
    assert_eq!(orgs[0].repos, vec!["gadget".to_string(), "widget".to_string()]);
}

#[cfg(unix)]
#[test]
fn conflict_is_preserved_across_sync_and_status() {
    let fixture = OrgFixture::new("acme");
    let widget = fixture.add_repo("widget");
    fixture.add_skill("reviewer", "Reviews code");
    let dest = widget.join(".claude/skills/reviewer");
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    fs::write(&dest, "hand-written").unwrap();

    let org = fixture.org();
    let results = linker::sync(&org).unwrap();
    let reviewer = results.iter().find(|r| r.repo == "widget").unwrap();
    assert_eq!(reviewer.action, LinkAction::Skipped);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "hand-written");

    let statuses = linker::status(&org).unwrap();
    let reviewer = statuses.iter().find(|s| s.repo == "widget").unwrap();
    assert_eq!(reviewer.state, LinkState::Conflict);
}

#[cfg(unix)]
#[test]
fn stale_link_converges() {
    let fixture = OrgFixture::new("acme");
    let widget = fixture.add_repo("widget");
    let skill = fixture.add_skill("reviewer", "Reviews code");
    let elsewhere = fixture.org_path.join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    let dest = widget.join(".claude/skills/reviewer");
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(&elsewhere, &dest).unwrap();

    let org = fixture.org();
    let before = linker::status(&org).unwrap();
    assert_eq!(
        before.iter().find(|s| s.repo == "widget").unwrap().state,
        LinkState::Stale
    );

    let results = linker::sync(&org).unwrap();
    assert_eq!(
        results.iter().find(|r| r.repo == "widget").unwrap().action,
        LinkAction::Created
    );
    assert_eq!(fs::read_link(&dest).unwrap(), skill);
}

#[cfg(unix)]
#[test]
fn unlink_removes_links_but_not_files() {
    let fixture = OrgFixture::new("acme");
    fixture.add_repo("widget");
    let gadget = fixture.add_repo("gadget");
    fixture.add_skill("reviewer", "Reviews code");
    let conflict = gadget.join(".claude/skills/reviewer");
    fs::create_dir_all(&conflict).unwrap();

    let org = fixture.org();
    linker::sync(&org).unwrap();
    let results = linker::unlink(&org).unwrap();

    // CLAUDE.md plus widget/reviewer; the directory in gadget is left alone
    assert_eq!(linker::count(&results, LinkAction::Removed), 2);
    assert!(conflict.is_dir());
    assert!(
        !fixture
            .org_path
            .join("widget/.claude/skills/reviewer")
            .exists()
    );

    let again = linker::unlink(&org).unwrap();
    assert!(again.is_empty());
}
