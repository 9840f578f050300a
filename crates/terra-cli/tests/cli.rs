use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn write_fixtures(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let accounts = dir.join("accounts.json");
    let opportunities = dir.join("opportunities.json");
    let reps = dir.join("reps.json");

    fs::write(
        &accounts,
        r#"[
            {
                "account_id": "acc-1",
                "name": "Acme Corp",
                "ultimate_parent_id": null,
                "arr": 300000.0,
                "atr": 0.0,
                "pipeline_value": 0.0,
                "hierarchy_arr": 300000.0,
                "hierarchy_bookings_arr_converted": null,
                "calculated_arr": null,
                "tier": "T1",
                "geo": "AMER",
                "sales_territory": null,
                "employee_count": null,
                "enterprise_vs_commercial": null,
                "industry": null,
                "pe_firm": null,
                "owner_id": "rep-1",
                "new_owner_id": null,
                "owner_change_date": null,
                "owners_lifetime": 1,
                "exclude_from_reassignment": false,
                "cre_count": 0,
                "cre_risk": false,
                "renewal_date": null
            }
        ]"#,
    )
    .unwrap();

    fs::write(
        &opportunities,
        r#"[
            {
                "opportunity_id": "opp-1",
                "account_id": "acc-1",
                "owner_id": "rep-1",
                "new_owner_id": null,
                "opportunity_type": "Renewals",
                "available_to_renew": 50000.0,
                "net_arr": 0.0,
                "amount": 50000.0,
                "renewal_event_date": null,
                "close_date": null,
                "cre_status": null
            }
        ]"#,
    )
    .unwrap();

    fs::write(
        &reps,
        r#"[
            {
                "rep_id": "rep-1",
                "name": "Rep One",
                "region": "AMER",
                "team_tier": "T1",
                "flm": null,
                "slm": null,
                "pe_firms": [],
                "is_active": true,
                "include_in_assignments": true,
                "is_manager": false,
                "is_strategic_rep": false,
                "is_backfill_source": false,
                "is_backfill_target": false,
                "backfill_target_rep_id": null
            }
        ]"#,
    )
    .unwrap();

    (accounts, opportunities, reps)
}

#[test]
fn import_generate_execute_round_trip() {
    let dir = tempdir().unwrap();
    let fixture = dir.path().join("fixture.json");
    let report = dir.path().join("report.json");
    let (accounts, opportunities, reps) = write_fixtures(dir.path());

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "import",
            "--fixture",
            fixture.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
            "--opportunities",
            opportunities.to_str().unwrap(),
            "--reps",
            reps.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(fixture.exists());

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "generate",
            "--fixture",
            fixture.to_str().unwrap(),
            "--out",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(report.exists());

    let report_json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report_json["total_accounts"], 1);
    assert_eq!(report_json["assigned_accounts"], 1);

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "execute",
            "--fixture",
            fixture.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();

    let fixture_json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&fixture).unwrap()).unwrap();
    assert_eq!(fixture_json["accounts"][0]["account"]["new_owner_id"], "rep-1");
}

#[test]
fn backfill_enable_then_disable() {
    let dir = tempdir().unwrap();
    let fixture = dir.path().join("fixture.json");
    let (accounts, opportunities, reps) = write_fixtures(dir.path());

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "import",
            "--fixture",
            fixture.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
            "--opportunities",
            opportunities.to_str().unwrap(),
            "--reps",
            reps.to_str().unwrap(),
        ])
        .assert()
        .success();

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "backfill",
            "enable",
            "--fixture",
            fixture.to_str().unwrap(),
            "--rep",
            "rep-1",
            "--actor",
            "test-actor",
        ])
        .assert()
        .success();

    Command::cargo_bin("terra-cli")
        .unwrap()
        .args([
            "backfill",
            "disable",
            "--fixture",
            fixture.to_str().unwrap(),
            "--rep",
            "rep-1",
            "--actor",
            "test-actor",
        ])
        .assert()
        .success();
}

#[test]
fn doctor_runs_without_a_fixture() {
    Command::cargo_bin("terra-cli").unwrap().arg("doctor").assert().success();
}
