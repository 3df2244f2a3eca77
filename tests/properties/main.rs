use proptest::prelude::*;

use chaparral::manifest::{bump_version, next_patch};

fn write_descriptor(content: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let skill = dir.path().join("skills/s");
    std::fs::create_dir_all(&skill).unwrap();
    std::fs::write(skill.join("plugin.json"), content).unwrap();
    dir
}

proptest! {
    #[test]
    fn bump_increments_patch(major in 0u32..100_000, minor in 0u32..100_000, patch in 0u32..u32::MAX) {
        let dir = write_descriptor(&format!(
            r#"{{"name": "s", "version": "{major}.{minor}.{patch}", "skills": "./"}}"#
        ));
        let bumped = bump_version(dir.path(), "skills", "s");
        prop_assert_eq!(bumped, format!("{major}.{minor}.{}", u64::from(patch) + 1));
    }

    #[test]
    fn malformed_versions_reset(version in "[a-z .-]{0,12}") {
        let dir = write_descriptor(&format!(r#"{{"version": "{version}"}}"#));
        prop_assert_eq!(bump_version(dir.path(), "skills", "s"), "0.1.0");
    }

    #[test]
    fn next_patch_keeps_major_and_minor(major in 0u64..1_000, minor in 0u64..1_000, patch in 0u64..1_000) {
        let next = next_patch(&format!("{major}.{minor}.{patch}")).unwrap();
        prop_assert_eq!(next, format!("{major}.{minor}.{}", patch + 1));
    }
}

#[test]
fn missing_descriptor_is_initial_version() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(bump_version(dir.path(), "skills", "absent"), "0.1.0");
}
