use gvg_core::db::open_db_in_memory;
use gvg_core::{
    CharacterId, CharacterService, CompositionError, Config, CounterDraft, CounterService,
    DefenseDraft, DefenseQuery, DefenseService, ServiceError, SessionState,
    SqliteCharacterRepository, SqliteCounterRepository, SqliteDefenseRepository,
};
use rusqlite::Connection;

struct Services<'conn> {
    characters: Vec<CharacterId>,
    defenses: DefenseService<SqliteDefenseRepository<'conn>, SqliteCharacterRepository<'conn>>,
    counters: CounterService<SqliteCounterRepository<'conn>, SqliteCharacterRepository<'conn>>,
}

fn services(conn: &Connection) -> Services<'_> {
    let images = Config::default().image_resolver().unwrap();
    let registry = CharacterService::new(
        SqliteCharacterRepository::try_new(conn).unwrap(),
        images.clone(),
    );
    let characters = registry
        .import_files(["A.png", "B.png", "C.png", "D.png", "X.png", "Y.png", "Z.png"])
        .unwrap()
        .into_iter()
        .map(|character| character.uuid)
        .collect();

    Services {
        characters,
        defenses: DefenseService::new(
            SqliteDefenseRepository::try_new(conn).unwrap(),
            SqliteCharacterRepository::try_new(conn).unwrap(),
            images.clone(),
        ),
        counters: CounterService::new(
            SqliteCounterRepository::try_new(conn).unwrap(),
            SqliteCharacterRepository::try_new(conn).unwrap(),
            images,
        ),
    }
}

impl Services<'_> {
    fn slots(&self, indexes: [usize; 3]) -> [Option<CharacterId>; 3] {
        indexes.map(|index| Some(self.characters[index]))
    }
}

#[test]
fn invalid_defense_drafts_write_nothing() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let (a, b) = (services.characters[0], services.characters[1]);

    let missing = DefenseDraft {
        slots: [Some(a), None, Some(b)],
        ..DefenseDraft::default()
    };
    assert!(matches!(
        services.defenses.save_defense(&missing).unwrap_err(),
        ServiceError::Validation(CompositionError::MissingMember { slot: 2 })
    ));

    let duplicate = DefenseDraft {
        slots: [Some(a), Some(b), Some(a)],
        ..DefenseDraft::default()
    };
    assert!(matches!(
        services.defenses.save_defense(&duplicate).unwrap_err(),
        ServiceError::Validation(CompositionError::DuplicateMember(id)) if id == a
    ));

    assert!(services.defenses.list_defenses().unwrap().is_empty());
}

#[test]
fn save_returns_the_stored_defense_for_reselection() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);

    let first = services
        .defenses
        .save_defense(&DefenseDraft {
            slots: services.slots([0, 1, 2]),
            wins: 1,
            ..DefenseDraft::default()
        })
        .unwrap();
    assert_eq!(first.label(), "A / B / C");

    let mut edited = DefenseDraft::from_view(&first);
    edited.slots = services.slots([2, 1, 0]);
    edited.member_notes[0] = "bait".to_string();
    let second = services.defenses.save_defense(&edited).unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.label(), "C / B / A");
    assert_eq!(second.member_notes[0], "bait");
    assert_eq!(services.defenses.list_defenses().unwrap().len(), 1);
}

#[test]
fn deleting_the_active_defense_clears_the_selection() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let mut session = SessionState::new();

    let kept = services
        .defenses
        .save_defense(&DefenseDraft {
            slots: services.slots([0, 1, 3]),
            ..DefenseDraft::default()
        })
        .unwrap();
    let doomed = services
        .defenses
        .save_defense(&DefenseDraft {
            slots: services.slots([0, 1, 2]),
            ..DefenseDraft::default()
        })
        .unwrap();

    session.set_active_defense(Some(kept.id));
    services.defenses.delete_defense(doomed.id, &mut session).unwrap();
    assert_eq!(session.active_defense(), Some(kept.id));

    services.defenses.delete_defense(kept.id, &mut session).unwrap();
    assert_eq!(session.active_defense(), None);
    assert!(services.counters.list_for_session(&session).unwrap().is_empty());
}

#[test]
fn counter_entry_requires_an_active_defense() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let session = SessionState::new();

    let err = services
        .counters
        .save_counter(
            &session,
            &CounterDraft {
                slots: services.slots([4, 5, 6]),
                ..CounterDraft::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::NoActiveDefense));
}

#[test]
fn counters_are_recorded_against_the_active_defense() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let mut session = SessionState::new();

    let defense = services
        .defenses
        .save_defense(&DefenseDraft {
            slots: services.slots([0, 1, 2]),
            ..DefenseDraft::default()
        })
        .unwrap();
    session.set_active_defense(Some(defense.id));

    services
        .counters
        .save_counter(
            &session,
            &CounterDraft {
                slots: services.slots([4, 5, 6]),
                wins: 1,
                notes: "safe".to_string(),
            },
        )
        .unwrap();
    let listed = services
        .counters
        .save_counter(
            &session,
            &CounterDraft {
                slots: services.slots([3, 5, 6]),
                wins: 2,
                ..CounterDraft::default()
            },
        )
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].wins, 2);
    assert_eq!(listed[1].notes, "safe");
    assert!(listed.iter().all(|counter| counter.defense_id == defense.id));

    let wins = services.counters.increment_wins(listed[1].id).unwrap();
    assert_eq!(wins, 2);

    let invalid = services.counters.save_counter(
        &session,
        &CounterDraft {
            slots: [None, None, None],
            ..CounterDraft::default()
        },
    );
    assert!(matches!(invalid, Err(ServiceError::Validation(_))));
}

#[test]
fn refresh_drops_a_selection_deleted_elsewhere() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let mut session = SessionState::new();

    let defense = services
        .defenses
        .save_defense(&DefenseDraft {
            slots: services.slots([0, 1, 2]),
            ..DefenseDraft::default()
        })
        .unwrap();
    session.set_active_defense(Some(defense.id));

    let mut other_session = SessionState::new();
    services
        .defenses
        .delete_defense(defense.id, &mut other_session)
        .unwrap();
    assert_eq!(session.active_defense(), Some(defense.id));

    let listed = services.defenses.refresh(&mut session).unwrap();
    assert!(listed.is_empty());
    assert_eq!(session.active_defense(), None);
}

#[test]
fn search_combines_member_and_text_filters() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);

    for slots in [[0, 1, 2], [2, 3, 1], [1, 3, 4]] {
        services
            .defenses
            .save_defense(&DefenseDraft {
                slots: services.slots(slots),
                ..DefenseDraft::default()
            })
            .unwrap();
    }

    let found = services
        .defenses
        .search(&DefenseQuery {
            text: "d".to_string(),
            members: vec![Some(services.characters[1]), Some(services.characters[2])],
            ..DefenseQuery::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].label(), "C / D / B");
}
