//! Session integration tests: the full upload, match, calculate and export
//! path, error recovery, and stale upload handling.

use agent_averages_core::{
    aggregation::FilterSelection,
    command::DashboardCommand,
    config::DashboardConfig,
    error::DashboardError,
    event::DashboardEvent,
    session::Dashboard,
    store::{RosterOrigin, RosterStore},
    types::{Branch, Position},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

const CRM_REPORT: &str = "\
Agent,Deals,Total Collected
AZN,4,\"$1,000.00\"
DXL,2,$500
FFS,3,$750
ZZZ,1,$50
TOTAL,10,\"$2,300\"
";

fn build() -> Dashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = RosterStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    Dashboard::open(DashboardConfig::default(), store)
}

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("agent-averages-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn error_kinds(events: &[DashboardEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::ErrorRaised { kind, .. } => Some(kind.clone()),
            _ => None,
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn open_reports_roster_load() {
    let mut dash = build();
    let events = dash.take_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        DashboardEvent::RosterLoaded { count: 34, origin } if origin == "default"
    ));
    assert_eq!(dash.snapshot().roster_origin, RosterOrigin::Default);
    assert!(dash.take_events().is_empty(), "events are drained");
}

#[test]
fn ingest_matches_and_skips() {
    let mut dash = build();
    dash.ingest_csv("report.csv", CRM_REPORT).unwrap();

    assert_eq!(dash.sales().len(), 4);
    assert_eq!(dash.matched().len(), 3);
    assert_eq!(dash.skipped(), &["ZZZ".to_string()]);

    let snapshot = dash.snapshot();
    assert!(snapshot.can_calculate);
    assert_eq!(snapshot.matched_count, 3);
}

#[test]
fn failed_ingest_keeps_prior_sales() {
    let mut dash = build();
    dash.ingest_csv("good.csv", CRM_REPORT).unwrap();

    let err = dash.ingest_csv("bad.csv", "Rep,Total\nAZN,5\n").unwrap_err();
    assert!(matches!(err, DashboardError::MissingColumn(_)));
    let err = dash.ingest_csv("empty.csv", "Agent,Total\n").unwrap_err();
    assert!(matches!(err, DashboardError::EmptyInput));

    assert_eq!(dash.matched().len(), 3, "prior sales data must be retained");
}

#[test]
fn calculate_and_keep_result_on_empty_selection() {
    let mut dash = build();
    dash.ingest_csv("report.csv", CRM_REPORT).unwrap();

    let result = dash.calculate(&FilterSelection::default()).unwrap();
    assert_eq!(result.agent_count, 3);
    assert_eq!(result.overall_average, 750.0);

    // OVS closers: nobody in the upload.
    let filter = FilterSelection::new([Branch::Ovs], [Position::Closer]).unwrap();
    let err = dash.calculate(&filter).unwrap_err();
    assert!(matches!(err, DashboardError::EmptySelection));

    let kept = dash.last_result().expect("previous result retained");
    assert_eq!(kept.agent_count, 3);
}

/// Adding an agent that was skipped pulls its sales into the matched set.
#[test]
fn roster_changes_rematch_loaded_sales() {
    let mut dash = build();
    dash.ingest_csv("report.csv", CRM_REPORT).unwrap();
    assert_eq!(dash.skipped().len(), 1);

    dash.add_agent("zzz", "OVS", "CLOSER").unwrap();
    assert!(dash.skipped().is_empty());
    assert_eq!(dash.matched().len(), 4);

    assert!(dash.remove_agent("AZN"));
    assert_eq!(dash.skipped(), &["AZN".to_string()]);
    assert!(!dash.remove_agent("AZN"), "second removal is a no-op");
}

#[test]
fn duplicate_add_is_rejected_and_roster_persisted_otherwise() {
    let mut dash = build();
    let err = dash.add_agent("azn", "TIJ", "CLOSER").unwrap_err();
    assert!(matches!(err, DashboardError::DuplicateIdentifier { .. }));

    dash.add_agent("new", "RSA", "DIALER").unwrap();
    let reloaded = dash.store().load_roster(&dash.config().storage_key);
    assert_eq!(reloaded.origin, RosterOrigin::Stored);
    assert!(reloaded.roster.contains("NEW"));
}

#[test]
fn import_merges_and_bad_files_change_nothing() {
    let mut dash = build();
    let before = dash.roster().clone();

    let err = dash.import_roster(r#"{"initials":"ABC"}"#).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidFormat { .. }));
    assert_eq!(dash.roster(), &before);

    let added = dash
        .import_roster(
            r#"[{"initials":"qqq","branch":"TIJ","position":"DIALER"},
                {"initials":"AZN","branch":"TIJ","position":"DIALER"},
                {"initials":"bad","branch":"NOPE","position":"DIALER"}]"#,
        )
        .unwrap();
    assert_eq!(added, 1);
    assert_eq!(dash.roster().len(), before.len() + 1);
}

#[test]
fn export_results_requires_a_calculation() {
    let mut dash = build();
    assert!(matches!(
        dash.export_results(chrono::Local::now()),
        Err(DashboardError::NoResults)
    ));

    dash.ingest_csv("report.csv", CRM_REPORT).unwrap();
    dash.calculate(&FilterSelection::default()).unwrap();
    dash.take_events();
    let csv = dash.export_results(chrono::Local::now()).unwrap();
    assert!(csv.contains("AGENT BREAKDOWN"));
    assert_eq!(
        dash.take_events(),
        vec![DashboardEvent::ResultsExported { agents: 3 }]
    );

    let snapshot = dash.snapshot();
    assert_eq!(snapshot.cards[0].label, "Overall Average");
    assert_eq!(snapshot.cards[0].value, "$750");
    assert_eq!(snapshot.breakdown[0].agent, "AZN");
    assert_eq!(snapshot.breakdown[0].vs_average, "+$250 (+33%)");
}

/// A read that finishes after a newer upload started must not apply.
#[test]
fn stale_upload_is_discarded() {
    let mut dash = build();
    let first = dash.begin_upload("first.csv").unwrap();
    let second = dash.begin_upload("second.CSV").unwrap();
    dash.take_events();

    let applied = dash.complete_upload(&first, Ok(CRM_REPORT.to_string())).unwrap();
    assert!(!applied);
    assert!(dash.sales().is_empty());
    assert!(matches!(
        dash.take_events().as_slice(),
        [DashboardEvent::StaleUploadDiscarded { generation: 1, .. }]
    ));

    let applied = dash
        .complete_upload(&second, Ok("Agent,Amount\nAZN,10\n".to_string()))
        .unwrap();
    assert!(applied);
    assert_eq!(dash.matched().len(), 1);
}

#[test]
fn non_csv_upload_is_rejected() {
    let mut dash = build();
    assert!(matches!(
        dash.begin_upload("report.xlsx"),
        Err(DashboardError::NotCsvFile { .. })
    ));
}

#[tokio::test]
async fn upload_file_reads_from_disk() {
    let mut dash = build();
    let path = temp_file("upload.csv", CRM_REPORT);

    assert!(dash.upload_file(&path).await.unwrap());
    assert_eq!(dash.matched().len(), 3);

    let missing = path.with_file_name("missing.csv");
    let err = dash.upload_file(&missing).await.unwrap_err();
    assert!(matches!(err, DashboardError::Io(_)));
    assert_eq!(dash.matched().len(), 3);
}

#[tokio::test]
async fn commands_run_end_to_end() {
    let mut dash = build();
    let csv = temp_file("commands.csv", CRM_REPORT);
    let out = csv.with_file_name("results.csv");
    let roster_out = csv.with_file_name("roster.json");
    dash.take_events();

    let commands = vec![
        DashboardCommand::AddAgent {
            initials: "zzz".into(),
            branch:   "OVS".into(),
            position: "DIALER".into(),
        },
        DashboardCommand::LoadCsv { path: csv.to_string_lossy().into_owned() },
        DashboardCommand::Calculate {
            branches:  Some(vec!["TIJ".into(), "OVS".into()]),
            positions: None,
        },
        DashboardCommand::ExportResults { path: out.to_string_lossy().into_owned() },
        DashboardCommand::ExportRoster { path: roster_out.to_string_lossy().into_owned() },
    ];
    for command in commands {
        assert!(dash.dispatch(command).await);
    }

    let result = dash.last_result().unwrap();
    assert_eq!(result.agent_count, 3, "AZN, DXL and ZZZ");

    let exported = std::fs::read_to_string(&out).unwrap();
    assert!(exported.starts_with("Agent Averages Report\n"));
    let roster_json = std::fs::read_to_string(&roster_out).unwrap();
    assert!(roster_json.contains("\"ZZZ\""));
}

#[tokio::test]
async fn failed_commands_become_error_events() {
    let mut dash = build();
    dash.take_events();

    let ok = dash
        .dispatch(DashboardCommand::Calculate { branches: Some(vec![]), positions: None })
        .await;
    assert!(!ok);
    let ok = dash
        .dispatch(DashboardCommand::AddAgent {
            initials: "".into(),
            branch:   "TIJ".into(),
            position: "CLOSER".into(),
        })
        .await;
    assert!(!ok);
    let ok = dash
        .dispatch(DashboardCommand::Calculate { branches: None, positions: None })
        .await;
    assert!(!ok, "nothing uploaded yet");

    let events = dash.take_events();
    assert_eq!(
        error_kinds(&events),
        vec!["empty_filter", "empty_identifier", "empty_selection"]
    );
    assert!(events.iter().all(DashboardEvent::is_error));
}

#[tokio::test]
async fn add_agent_command_accepts_lower_case_codes() {
    let mut dash = build();
    let ok = dash
        .dispatch(DashboardCommand::AddAgent {
            initials: "low".into(),
            branch:   "tij".into(),
            position: "dialer".into(),
        })
        .await;
    assert!(ok);
    let agent = dash.roster().find("LOW").unwrap();
    assert_eq!((agent.branch, agent.position), (Branch::Tij, Position::Dialer));
}
