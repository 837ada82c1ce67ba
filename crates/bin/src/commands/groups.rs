//! Groups command - prints group membership from a record file.

use serde::Serialize;
use yspotify::{
    GroupCatalog, Snapshot,
    store::{JsonFileStore, RecordStore},
};

use crate::cli::GroupsArgs;
use crate::output::{OutputFormat, print_table};

/// One line of the report
#[derive(Debug, PartialEq, Eq, Serialize)]
struct GroupReport {
    name: String,
    members: usize,
    leader: Option<String>,
}

fn build_report(snapshot: &Snapshot, catalog: &GroupCatalog) -> Vec<GroupReport> {
    catalog
        .names()
        .iter()
        .map(|name| GroupReport {
            name: name.clone(),
            members: snapshot.member_count(name),
            leader: snapshot.leader_of(name).map(|r| r.username.clone()),
        })
        .collect()
}

/// Run the groups command
pub async fn run(args: &GroupsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(&args.users_file);
    let snapshot = store.load().await?;
    let catalog = GroupCatalog::new(&args.groups.names);
    let report = build_report(&snapshot, &catalog);

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = report
                .iter()
                .map(|g| {
                    vec![
                        g.name.clone(),
                        g.members.to_string(),
                        g.leader.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect();
            print_table(&["GROUP", "MEMBERS", "LEADER"], &rows);
            println!();
            println!("{} users in {}", snapshot.len(), store.describe());
        }
    }

    for group in snapshot.leaderless_groups() {
        eprintln!("warning: group '{group}' has members but no leader");
    }
    for violation in snapshot.violations() {
        eprintln!("warning: {violation}");
    }
    Ok(())
}
