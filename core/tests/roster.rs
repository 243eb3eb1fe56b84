//! Roster model: add / remove / import-merge / export.
//!
//! Verifies:
//!   - ids are unique after normalization, roster stays sorted
//!   - add then remove restores the original roster
//!   - import drops invalid entries and skips duplicates (also within a batch)
//!   - non-array import documents are InvalidFormat

use agent_averages_core::{
    error::DashboardError,
    roster::{default_roster, parse_roster_import, Agent, RawAgentRecord, Roster},
    types::{Branch, Position},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn agent(id: &str, branch: Branch, position: Position) -> Agent {
    Agent::new(id, branch, position).unwrap()
}

fn small_roster() -> Roster {
    Roster::from_agents([
        agent("JXM", Branch::Tij, Position::Dialer),
        agent("AZN", Branch::Tij, Position::Closer),
        agent("FFS", Branch::Rsa, Position::Dialer),
    ])
}

fn ids(roster: &Roster) -> Vec<&str> {
    roster.agents().iter().map(|a| a.id.as_str()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn default_roster_is_sorted_and_unique() {
    let roster = default_roster();
    assert_eq!(roster.len(), 34);

    let listed = ids(&roster);
    let mut sorted = listed.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(listed, sorted, "default roster must be sorted with unique ids");

    for branch in Branch::ALL {
        assert!(
            roster.agents().iter().any(|a| a.branch == branch),
            "default roster has no {branch} agents"
        );
    }
}

#[test]
fn add_inserts_in_sorted_position() {
    let roster = small_roster()
        .add(agent("BQX", Branch::Ovs, Position::Dialer))
        .unwrap();
    assert_eq!(ids(&roster), vec!["AZN", "BQX", "FFS", "JXM"]);
}

/// Duplicate detection normalizes case and whitespace first.
#[test]
fn add_rejects_duplicate_case_insensitively() {
    let roster = small_roster();
    let candidate = Agent {
        id: " azn ".into(),
        branch: Branch::Rsa,
        position: Position::Dialer,
    };
    let err = roster.add(candidate).unwrap_err();
    match err {
        DashboardError::DuplicateIdentifier { id } => assert_eq!(id, "AZN"),
        other => panic!("expected DuplicateIdentifier, got {other:?}"),
    }
    assert_eq!(roster.len(), 3, "receiver must be unchanged");
}

#[test]
fn add_then_remove_restores_roster() {
    let original = small_roster();
    let added = original
        .add(agent("ZZQ", Branch::Ovs, Position::Closer))
        .unwrap();
    assert_eq!(added.len(), 4);
    assert_eq!(added.remove("ZZQ"), original);
}

#[test]
fn remove_absent_id_is_noop() {
    let roster = small_roster();
    assert_eq!(roster.remove("NOPE"), roster);
}

#[test]
fn agent_parse_checks_fields_in_form_order() {
    assert!(matches!(
        Agent::parse("  ", "XXX", "YYY"),
        Err(DashboardError::EmptyIdentifier)
    ));
    assert!(matches!(
        Agent::parse("abc", "XXX", "CLOSER"),
        Err(DashboardError::UnknownBranch(b)) if b == "XXX"
    ));
    assert!(matches!(
        Agent::parse("abc", "TIJ", "SETTER"),
        Err(DashboardError::UnknownPosition(_))
    ));

    let parsed = Agent::parse(" abc ", "OVS", "DIALER").unwrap();
    assert_eq!(parsed, agent("ABC", Branch::Ovs, Position::Dialer));
}

/// Form input accepts any case, like filter codes do.
#[test]
fn agent_parse_accepts_lower_case_codes() {
    let parsed = Agent::parse("abc", " tij ", "closer").unwrap();
    assert_eq!(parsed, agent("ABC", Branch::Tij, Position::Closer));
}

#[test]
fn import_of_empty_batch_changes_nothing() {
    let roster = small_roster();
    let (merged, added) = roster.import_merge(&[]);
    assert_eq!(added, 0);
    assert_eq!(merged, roster);
}

#[test]
fn import_filters_invalid_and_duplicate_entries() {
    let roster = small_roster();
    let candidates = vec![
        RawAgentRecord::new("new", "OVS", "DIALER"),    // added as NEW
        RawAgentRecord::new("AZN", "RSA", "CLOSER"),    // already on roster
        RawAgentRecord::new("BAD", "XYZ", "DIALER"),    // bad branch
        RawAgentRecord::new("BAD2", "TIJ", "MANAGER"),  // bad position
        RawAgentRecord::new("", "TIJ", "CLOSER"),       // empty id
        RawAgentRecord::new("NEW", "TIJ", "CLOSER"),    // duplicate within batch
        RawAgentRecord::default(),                      // nothing at all
    ];

    let (merged, added) = roster.import_merge(&candidates);
    assert_eq!(added, 1);
    assert_eq!(ids(&merged), vec!["AZN", "FFS", "JXM", "NEW"]);

    let new = merged.find("NEW").unwrap();
    assert_eq!(new.branch, Branch::Ovs, "first occurrence in the batch wins");

    let azn = merged.find("AZN").unwrap();
    assert_eq!(azn.branch, Branch::Tij, "existing entries are never overwritten");
}

#[test]
fn import_branch_codes_are_case_sensitive() {
    let (merged, added) = Roster::new().import_merge(&[RawAgentRecord::new("AAA", "tij", "CLOSER")]);
    assert_eq!(added, 0);
    assert!(merged.is_empty());
}

#[test]
fn parse_import_accepts_arrays_only() {
    let records = parse_roster_import(
        r#"[{"initials":"abc","branch":"TIJ","position":"CLOSER"}, 42, {"initials":7}]"#,
    )
    .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], RawAgentRecord::new("abc", "TIJ", "CLOSER"));
    assert_eq!(records[1], RawAgentRecord::default());
    assert_eq!(records[2].initials, None, "non-string initials are ignored");

    for bad in [r#"{"initials":"ABC"}"#, "not json", "null"] {
        assert!(
            matches!(parse_roster_import(bad), Err(DashboardError::InvalidFormat { .. })),
            "expected InvalidFormat for {bad:?}"
        );
    }
}

#[test]
fn export_round_trips_through_import() {
    let roster = small_roster();
    let json = roster.to_export_json().unwrap();
    assert!(json.contains("\"initials\": \"AZN\""));

    let (restored, added) = Roster::new().import_merge(&parse_roster_import(&json).unwrap());
    assert_eq!(added, 3);
    assert_eq!(restored, roster);
}

#[test]
fn export_of_empty_roster_fails() {
    assert!(matches!(
        Roster::new().to_export_json(),
        Err(DashboardError::EmptyRoster)
    ));
}
