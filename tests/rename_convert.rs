mod common;

use anyhow::Result;

use siteloom::error::StoreError;
use siteloom::rename::{convert_to_bundle, create_page, delete_path, rename_file, rename_folder};
use siteloom::store::ContentStore;

#[test]
fn file_rename_moves_content_in_one_commit() -> Result<()> {
    let store = common::seed_site();
    let before = store.commit_count();

    rename_file(&store, "content/about.md", "content/about-us.md", false)?;

    assert_eq!(store.commit_count(), before + 1);
    assert_eq!(store.read_file("content/about-us.md")?, b"# About us\n");
    assert!(matches!(
        store.read_file("content/about.md"),
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn file_rename_refuses_occupied_destination() -> Result<()> {
    let store = common::seed_site();
    let err = rename_file(
        &store,
        "content/about.md",
        "content/blog/first-post.md",
        false,
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    // Nothing moved, nothing committed.
    assert_eq!(store.commit_count(), 0);
    assert_eq!(store.read_file("content/about.md")?, b"# About us\n");
    Ok(())
}

#[test]
fn file_rename_with_overwrite_replaces_destination_in_one_commit() -> Result<()> {
    let store = common::seed_site();
    let before = store.commit_count();
    rename_file(
        &store,
        "content/about.md",
        "content/blog/first-post.md",
        true,
    )?;
    assert_eq!(store.commit_count(), before + 1);
    assert_eq!(store.read_file("content/blog/first-post.md")?, b"# About us\n");
    assert!(matches!(
        store.read_file("content/about.md"),
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn failed_overwrite_rename_leaves_both_files_intact() -> Result<()> {
    let store = common::seed_site();
    store.fail_writes_to("content/blog/first-post.md");

    let err = rename_file(
        &store,
        "content/about.md",
        "content/blog/first-post.md",
        true,
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));

    // The destination's content is never deleted ahead of its replacement.
    assert_eq!(store.read_file("content/blog/first-post.md")?, b"# First post\n");
    assert_eq!(store.read_file("content/about.md")?, b"# About us\n");
    assert_eq!(store.commit_count(), 0);
    Ok(())
}

#[test]
fn folder_rename_moves_every_descendant_blob() -> Result<()> {
    let store = common::seed_site();
    let before = store.commit_count();

    rename_folder(&store, "content/blog", "content/articles")?;

    assert_eq!(store.commit_count(), before + 1);
    let paths = store.paths();
    assert!(paths.iter().all(|p| !p.starts_with("content/blog")));
    for moved in [
        "content/articles/_index.md",
        "content/articles/first-post.md",
        "content/articles/second-post.md",
    ] {
        assert!(store.read_file(moved).is_ok(), "missing {}", moved);
    }
    Ok(())
}

#[test]
fn folder_rename_refuses_occupied_destination_prefix() -> Result<()> {
    let store = common::seed_site();
    store.seed("content/articles/old.md", "# Old\n");

    let err = rename_folder(&store, "content/blog", "content/articles").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    assert!(store.read_file("content/blog/_index.md").is_ok());
    Ok(())
}

#[test]
fn convert_leaf_to_bundle_preserves_content() -> Result<()> {
    let store = common::seed_site();
    let done = convert_to_bundle(&store, "content/about.md", "team", b"# Team\n")?;

    assert_eq!(done.index_path, "content/about/_index.md");
    assert_eq!(done.child_path, "content/about/team.md");
    assert_eq!(store.read_file("content/about/_index.md")?, b"# About us\n");
    assert_eq!(store.read_file("content/about/team.md")?, b"# Team\n");
    assert!(matches!(
        store.read_file("content/about.md"),
        Err(StoreError::NotFound(_))
    ));
    // Three strictly ordered sub-operations, one commit each.
    assert_eq!(done.commits.len(), 3);
    Ok(())
}

#[test]
fn convert_aborts_untouched_when_index_write_fails() -> Result<()> {
    let store = common::seed_site();
    store.fail_writes_to("content/about/_index.md");

    let err = convert_to_bundle(&store, "content/about.md", "team", b"# Team\n").unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));

    assert_eq!(store.read_file("content/about.md")?, b"# About us\n");
    assert!(matches!(
        store.read_file("content/about/team.md"),
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(store.commit_count(), 0);
    Ok(())
}

#[test]
fn convert_keeps_leaf_when_child_write_fails() -> Result<()> {
    let store = common::seed_site();
    store.fail_writes_to("content/about/team.md");

    convert_to_bundle(&store, "content/about.md", "team", b"# Team\n").unwrap_err();

    // The stray index file is acceptable; the original never goes away.
    assert_eq!(store.read_file("content/about.md")?, b"# About us\n");
    assert!(store.read_file("content/about/_index.md").is_ok());
    Ok(())
}

#[test]
fn convert_refuses_destination_already_holding_content() -> Result<()> {
    let store = common::seed_site();
    store.seed("content/about/_index.md", "# Someone else's index\n");

    let err = convert_to_bundle(&store, "content/about.md", "team", b"# Team\n").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    assert_eq!(store.read_file("content/about.md")?, b"# About us\n");
    Ok(())
}

#[test]
fn create_page_refuses_collisions() -> Result<()> {
    let store = common::seed_site();
    create_page(&store, "content/contact.md", b"# Contact\n")?;
    assert_eq!(store.read_file("content/contact.md")?, b"# Contact\n");

    let err = create_page(&store, "content/contact.md", b"other").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    Ok(())
}

#[test]
fn delete_path_removes_a_subtree_in_one_commit() -> Result<()> {
    let store = common::seed_site();
    let before = store.commit_count();

    delete_path(&store, "content/blog")?;

    assert_eq!(store.commit_count(), before + 1);
    assert!(store.paths().iter().all(|p| !p.starts_with("content/blog")));
    Ok(())
}

#[test]
fn delete_missing_path_is_not_found() {
    let store = common::seed_site();
    let err = delete_path(&store, "content/nope.md").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
