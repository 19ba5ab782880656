//! Given steps for work orchestration BDD scenarios.

use super::world::{PLAYGROUND, WorkWorld, run_async, split_list};
use eyre::WrapErr;
use liq_work::work::{
    adapters::memory::LocalCheckout,
    domain::{CallerIdentity, IssueReference, IssueStatus, ProjectName, RepoVisibility},
    services::StartWorkRequest,
};
use rstest_bdd_macros::given;

fn add_checkout(
    world: &mut WorkWorld,
    project: &str,
    visibility: RepoVisibility,
) -> Result<(), eyre::Report> {
    let name = ProjectName::new(project).wrap_err("parse project name")?;
    world
        .hosting
        .add_repository(name.org(), name.repo_base_name(), visibility)
        .wrap_err("register repository")?;
    world
        .vcs
        .add_checkout(
            format!("{PLAYGROUND}/{name}"),
            LocalCheckout::new(format!("git@github.com:{name}.git")),
        )
        .wrap_err("register checkout")?;
    world.local_projects.push(name);
    Ok(())
}

#[given(r#"a checkout of public project "{project}""#)]
fn public_checkout(world: &mut WorkWorld, project: String) -> Result<(), eyre::Report> {
    add_checkout(world, &project, RepoVisibility::Public)
}

#[given(r#"a checkout of private project "{project}""#)]
fn private_checkout(world: &mut WorkWorld, project: String) -> Result<(), eyre::Report> {
    add_checkout(world, &project, RepoVisibility::Private)
}

#[given(r#"an open issue "{issue}""#)]
fn open_issue(world: &mut WorkWorld, issue: String) -> Result<(), eyre::Report> {
    let reference = IssueReference::parse(&issue).wrap_err("parse issue reference")?;
    world
        .tracker
        .insert_issue(reference, IssueStatus::open())
        .wrap_err("register issue")?;
    Ok(())
}

#[given(r#"an issue "{issue}" assigned to "{assignee}""#)]
fn assigned_issue(
    world: &mut WorkWorld,
    issue: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let reference = IssueReference::parse(&issue).wrap_err("parse issue reference")?;
    let login = CallerIdentity::new(assignee).wrap_err("parse assignee")?;
    world
        .tracker
        .insert_issue(reference, IssueStatus::open().with_assignees([login]))
        .wrap_err("register issue")?;
    Ok(())
}

#[given(r#"work has started on issue "{issue}" in "{projects}""#)]
fn work_started(
    world: &mut WorkWorld,
    issue: String,
    projects: String,
) -> Result<(), eyre::Report> {
    let request = StartWorkRequest::new([issue]).with_projects(split_list(&projects));
    run_async(world.orchestrator().start_work(request)).wrap_err("start initial work")?;
    Ok(())
}
