use gvg_core::db::open_db_in_memory;
use gvg_core::{
    Character, CharacterRepository, Counter, CounterRepository, Defense, DefenseRepository,
    RepoError, Roster, SqliteCharacterRepository, SqliteCounterRepository,
    SqliteDefenseRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_characters(conn: &Connection, names: &[&str]) -> Vec<Uuid> {
    let repo = SqliteCharacterRepository::try_new(conn).unwrap();
    names
        .iter()
        .map(|name| repo.upsert_character(&Character::new(*name, None)).unwrap().uuid)
        .collect()
}

#[test]
fn permuted_upsert_keeps_a_single_record() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_characters(&conn, &["A", "B", "C"]);
    let repo = SqliteDefenseRepository::try_new(&conn).unwrap();

    let first = Defense {
        wins: 2,
        notes: "first".to_string(),
        ..Defense::new(Roster::new([ids[0], ids[1], ids[2]]).unwrap())
    };
    let first_id = repo.upsert_defense(&first).unwrap();

    let second = Defense {
        member_notes: ["", "tank", ""].map(str::to_string),
        wins: 4,
        notes: "second".to_string(),
        ..Defense::new(Roster::new([ids[2], ids[0], ids[1]]).unwrap())
    };
    let second_id = repo.upsert_defense(&second).unwrap();

    assert_eq!(second_id, first_id, "conflict keeps the surviving identity");
    let all = repo.list_defenses().unwrap();
    assert_eq!(all.len(), 1);

    let stored = &all[0];
    assert_eq!(stored.roster.members(), &[ids[2], ids[0], ids[1]]);
    assert_eq!(stored.member_notes[1], "tank");
    assert_eq!(stored.wins, 4);
    assert_eq!(stored.notes, "second");
    assert_eq!(stored.composition_key(), first.composition_key());
}

#[test]
fn find_by_key_matches_any_slot_order() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_characters(&conn, &["A", "B", "C"]);
    let repo = SqliteDefenseRepository::try_new(&conn).unwrap();

    let defense = Defense::new(Roster::new([ids[0], ids[1], ids[2]]).unwrap());
    let id = repo.upsert_defense(&defense).unwrap();

    let lookup = Roster::new([ids[1], ids[2], ids[0]]).unwrap().key();
    let found = repo.find_by_key(&lookup).unwrap().unwrap();
    assert_eq!(found.uuid, id);
}

#[test]
fn listing_keeps_insertion_order_across_upserts() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_characters(&conn, &["A", "B", "C", "D"]);
    let repo = SqliteDefenseRepository::try_new(&conn).unwrap();

    let abc = Defense::new(Roster::new([ids[0], ids[1], ids[2]]).unwrap());
    let abd = Defense::new(Roster::new([ids[0], ids[1], ids[3]]).unwrap());
    let abc_id = repo.upsert_defense(&abc).unwrap();
    let abd_id = repo.upsert_defense(&abd).unwrap();
    repo.upsert_defense(&Defense {
        wins: 9,
        ..Defense::new(Roster::new([ids[2], ids[1], ids[0]]).unwrap())
    })
    .unwrap();

    let order = repo
        .list_defenses()
        .unwrap()
        .into_iter()
        .map(|defense| defense.uuid)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![abc_id, abd_id]);
}

#[test]
fn delete_cascades_to_counters() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_characters(&conn, &["A", "B", "C", "X", "Y", "Z"]);
    let defenses = SqliteDefenseRepository::try_new(&conn).unwrap();
    let counters = SqliteCounterRepository::try_new(&conn).unwrap();

    let defense_id = defenses
        .upsert_defense(&Defense::new(Roster::new([ids[0], ids[1], ids[2]]).unwrap()))
        .unwrap();
    counters
        .upsert_counter(&Counter::new(
            defense_id,
            Roster::new([ids[3], ids[4], ids[5]]).unwrap(),
        ))
        .unwrap();
    counters
        .upsert_counter(&Counter::new(
            defense_id,
            Roster::new([ids[0], ids[4], ids[5]]).unwrap(),
        ))
        .unwrap();
    assert_eq!(counters.count_for_defense(defense_id).unwrap(), 2);

    defenses.delete_defense(defense_id).unwrap();

    assert!(defenses.get_defense(defense_id).unwrap().is_none());
    assert_eq!(counters.count_for_defense(defense_id).unwrap(), 0);
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM counters;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn deleting_missing_defense_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDefenseRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo.delete_defense(missing).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: "defense", id } if id == missing
    ));
}

#[test]
fn defenses_must_reference_registered_characters() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDefenseRepository::try_new(&conn).unwrap();
    let roster = Roster::new([Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()]).unwrap();

    let err = repo.upsert_defense(&Defense::new(roster)).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_defenses().unwrap().is_empty());
}
