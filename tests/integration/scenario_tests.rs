//! acme / widget / reviewer, from first sync to second write.

use chaparral::linker::{self, LinkAction};
use chaparral::publish::write_manifests;

use crate::common::OrgFixture;

#[cfg(unix)]
#[test]
fn sync_then_write_twice() {
    let fixture = OrgFixture::new("acme");
    fixture.add_repo("widget");
    fixture.add_skill("reviewer", "Reviews code");
    let org = fixture.org();
    let skills = fixture.skills();

    let first = linker::sync(&org).unwrap();
    let reviewer = first
        .iter()
        .find(|r| r.repo == "widget" && r.skill == "reviewer")
        .unwrap();
    assert_eq!(reviewer.action, LinkAction::Created);

    let second = linker::sync(&org).unwrap();
    assert_eq!(linker::count(&second, LinkAction::Created), 0);
    assert!(second.iter().all(|r| r.action == LinkAction::Exists));

    write_manifests(&org, &skills).unwrap().into_result().unwrap();
    let plugin = fixture.read_json("brand/skills/reviewer/plugin.json");
    assert_eq!(plugin["name"], "reviewer");
    assert_eq!(plugin["description"], "Reviews code");
    assert_eq!(plugin["version"], "0.1.0");
    assert_eq!(plugin["skills"], "./");

    write_manifests(&org, &skills).unwrap().into_result().unwrap();
    let plugin = fixture.read_json("brand/skills/reviewer/plugin.json");
    assert_eq!(plugin["version"], "0.1.1");

    // pretty-printed with a trailing newline
    let raw = fixture.read("brand/skills/reviewer/plugin.json");
    assert!(raw.starts_with("{\n  \"name\": \"reviewer\""));
    assert!(raw.ends_with("}\n"));
}
