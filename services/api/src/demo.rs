use crate::infra::{
    InMemoryNotificationGateway, InMemoryUserRepository, InMemoryVacationRepository,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

use leave_hub::error::AppError;
use leave_hub::workflows::directory::DirectoryService;
use leave_hub::workflows::notifications::NotificationGateway;
use leave_hub::workflows::vacation::{parse_date, SubmitRequest, VacationService};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the requested vacation (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Last day of the requested vacation (YYYY-MM-DD). Defaults to start + 4 days.
    #[arg(long, value_parser = parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Free-text reason attached to the request.
    #[arg(long, default_value = "Family trip")]
    pub(crate) reason: String,
    /// Reject the request instead of approving it.
    #[arg(long)]
    pub(crate) reject: bool,
    /// Manager notes recorded with the decision.
    #[arg(long)]
    pub(crate) manager_notes: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start_date,
        end_date,
        reason,
        reject,
        manager_notes,
    } = args;

    let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());
    let end_date = end_date.unwrap_or_else(|| start_date + chrono::Duration::days(4));

    println!("Vacation workflow demo");

    let users = Arc::new(InMemoryUserRepository::default());
    let requests = Arc::new(InMemoryVacationRepository::default());
    let gateway = Arc::new(InMemoryNotificationGateway::default());
    let directory = DirectoryService::new(users.clone(), gateway.clone());
    let vacation = VacationService::new(requests, users, gateway.clone());

    let manager = match directory.create(
        "Jordan Reyes".to_string(),
        "jordan.reyes@example.com".to_string(),
        None,
    ) {
        Ok(view) => view,
        Err(err) => {
            println!("  Could not seed the manager: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Registered manager {} <{}> (subscriber {})",
        manager.name, manager.email, manager.subscriber_id
    );

    let employee = match directory.create(
        "Sam Okafor".to_string(),
        "sam.okafor@example.com".to_string(),
        Some(manager.id.clone()),
    ) {
        Ok(view) => view,
        Err(err) => {
            println!("  Could not seed the employee: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Registered employee {} reporting to {}",
        employee.name,
        employee
            .manager
            .as_ref()
            .map(|summary| summary.name.as_str())
            .unwrap_or("nobody")
    );

    let submitted = match vacation.submit(SubmitRequest {
        employee_id: employee.id.clone(),
        start_date,
        end_date,
        reason,
    }) {
        Ok(view) => view,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Submitted request {} ({} to {}) -> status {}",
        submitted.id.0,
        submitted.start_date,
        submitted.end_date,
        submitted.status.label()
    );

    let decided = if reject {
        vacation.reject(&submitted.id, manager_notes)
    } else {
        vacation.approve(&submitted.id, manager_notes)
    };
    let decided = match decided {
        Ok(view) => view,
        Err(err) => {
            println!("  Review failed: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Manager decision: {} (notes: {})",
        decided.status.label(),
        if decided.manager_notes.is_empty() {
            "none"
        } else {
            decided.manager_notes.as_str()
        }
    );

    println!("\nNotification feeds");
    for view in [&manager, &employee] {
        match gateway.feed(&view.subscriber_id, 20) {
            Ok(feed) => {
                let count = feed
                    .get("data")
                    .and_then(serde_json::Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                println!("- {}: {} event(s)", view.name, count);
                if let Some(events) = feed.get("data").and_then(serde_json::Value::as_array) {
                    for event in events {
                        println!(
                            "    {} {}",
                            event
                                .get("workflow")
                                .and_then(serde_json::Value::as_str)
                                .unwrap_or("?"),
                            event.get("payload").cloned().unwrap_or_default()
                        );
                    }
                }
            }
            Err(err) => println!("- {}: feed unavailable ({})", view.name, err),
        }
    }

    Ok(())
}
