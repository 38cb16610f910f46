use gvg_core::db::open_db_in_memory;
use gvg_core::{Character, CharacterRepository, CharacterService, Config, SqliteCharacterRepository};

#[test]
fn reimport_replaces_image_and_keeps_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCharacterRepository::try_new(&conn).unwrap();

    let first = repo
        .upsert_character(&Character::new("Artemis", Some("Artemis.png".to_string())))
        .unwrap();
    let second = repo
        .upsert_character(&Character::new("artemis", Some("artemis.webp".to_string())))
        .unwrap();

    assert_eq!(second.uuid, first.uuid);
    assert_eq!(second.name, "Artemis");
    assert_eq!(second.image_path.as_deref(), Some("artemis.webp"));
    assert_eq!(repo.list_characters().unwrap().len(), 1);
}

#[test]
fn find_by_name_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCharacterRepository::try_new(&conn).unwrap();
    let stored = repo.upsert_character(&Character::new("Marcus", None)).unwrap();

    let found = repo.find_by_name("  MARCUS ").unwrap().unwrap();
    assert_eq!(found.uuid, stored.uuid);
    assert_eq!(found.name, "Marcus");
    assert!(repo.find_by_name("Marc").unwrap().is_none());
}

#[test]
fn blank_names_are_rejected_by_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCharacterRepository::try_new(&conn).unwrap();

    assert!(repo.upsert_character(&Character::new("   ", None)).is_err());
    assert!(repo.list_characters().unwrap().is_empty());
}

#[test]
fn import_files_derives_names_and_skips_blanks() {
    let conn = open_db_in_memory().unwrap();
    let service = CharacterService::new(
        SqliteCharacterRepository::try_new(&conn).unwrap(),
        Config::default().image_resolver().unwrap(),
    );

    let imported = service
        .import_files(["Zed.png", ".png", "  Ana   Lee .jpg", "Artemis.png"])
        .unwrap();
    let names = imported
        .iter()
        .map(|character| character.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Zed", "Ana Lee", "Artemis"]);

    let listed = service
        .list_characters()
        .unwrap()
        .into_iter()
        .map(|view| view.name)
        .collect::<Vec<_>>();
    assert_eq!(listed, vec!["Ana Lee", "Artemis", "Zed"]);
}

#[test]
fn views_carry_resolved_image_urls() {
    let conn = open_db_in_memory().unwrap();
    let service = CharacterService::new(
        SqliteCharacterRepository::try_new(&conn).unwrap(),
        Config::default().image_resolver().unwrap(),
    );
    let stored = service.import_file("Ana Lee.png").unwrap().unwrap();

    let view = service.get_character(stored.uuid).unwrap().unwrap();
    assert_eq!(
        view.image_url.as_deref(),
        Some("http://localhost:54321/storage/v1/object/public/characters/Ana%20Lee.png")
    );
}

#[test]
fn suggestions_rank_prefix_matches_first() {
    let conn = open_db_in_memory().unwrap();
    let service = CharacterService::new(
        SqliteCharacterRepository::try_new(&conn).unwrap(),
        Config::default().image_resolver().unwrap(),
    );
    service
        .import_files(["Marcus.png", "Artemis.png", "Arlo.png", "Zed.png"])
        .unwrap();

    let names = service
        .suggest("ar")
        .unwrap()
        .into_iter()
        .map(|view| view.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Arlo", "Artemis", "Marcus"]);
}
