//! Then steps for work orchestration BDD scenarios.

use super::world::{WorkWorld, run_async, split_list};
use liq_work::work::{
    adapters::memory::VcsOperation,
    domain::{RemoteName, WorkKey},
    services::WorkErrorKind,
};
use rstest_bdd_macros::then;

#[then(r#"work "{work_key}" is stored"#)]
fn work_is_stored(world: &WorkWorld, work_key: String) -> Result<(), eyre::Report> {
    let result = world
        .last_start_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing start result in scenario world"))?;
    let report = result
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected start failure: {err}"))?;
    let key = WorkKey::new(work_key).map_err(|err| eyre::eyre!("invalid work key: {err}"))?;
    let stored = run_async(world.orchestrator().registry().require_data(&key))
        .map_err(|err| eyre::eyre!("lookup failed: {err}"))?;

    if stored != report.work {
        return Err(eyre::eyre!("stored work does not match the reported work"));
    }
    Ok(())
}

#[then(r#"a fork of "{project}" was requested"#)]
fn fork_requested(world: &WorkWorld, project: String) -> Result<(), eyre::Report> {
    let requests = world
        .hosting
        .fork_requests()
        .map_err(|err| eyre::eyre!("fork requests unreadable: {err}"))?;
    let requested = requests
        .iter()
        .any(|request| format!("{}/{}", request.org, request.repo) == project);
    if !requested {
        return Err(eyre::eyre!("expected a fork of {project}, got {requests:?}"));
    }
    Ok(())
}

#[then("no fork was requested")]
fn no_fork_requested(world: &WorkWorld) -> Result<(), eyre::Report> {
    let requests = world
        .hosting
        .fork_requests()
        .map_err(|err| eyre::eyre!("fork requests unreadable: {err}"))?;
    if !requests.is_empty() {
        return Err(eyre::eyre!("expected no fork requests, got {requests:?}"));
    }
    Ok(())
}

#[then(r#"the work branch was created and pushed to the "{remote}" remote"#)]
fn branch_created_on_remote(world: &WorkWorld, remote: String) -> Result<(), eyre::Report> {
    let expected =
        RemoteName::new(remote).map_err(|err| eyre::eyre!("invalid remote name: {err}"))?;
    let operations = world
        .vcs
        .operations()
        .map_err(|err| eyre::eyre!("operations unreadable: {err}"))?;
    let pushed = operations.iter().any(|operation| {
        matches!(operation, VcsOperation::CreateAndPush { remote: used, .. } if used == &expected)
    });
    if !pushed {
        return Err(eyre::eyre!(
            "expected a branch pushed to {expected}, got {operations:?}"
        ));
    }
    Ok(())
}

#[then("starting work fails with a conflict")]
fn start_conflicts(world: &WorkWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_start_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing start result in scenario world"))?;
    match result {
        Err(err) if err.kind() == WorkErrorKind::Conflict => Ok(()),
        other => Err(eyre::eyre!("expected a conflict, got {other:?}")),
    }
}

#[then("no work is stored")]
fn no_work_stored(world: &WorkWorld) -> Result<(), eyre::Report> {
    let empty = world
        .store
        .is_empty()
        .map_err(|err| eyre::eyre!("store unreadable: {err}"))?;
    if !empty {
        return Err(eyre::eyre!("expected an empty work registry"));
    }
    Ok(())
}

#[then(r#"the projects were built in the order "{projects}""#)]
fn projects_built_in_order(world: &WorkWorld, projects: String) -> Result<(), eyre::Report> {
    let result = world
        .last_build_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing build result in scenario world"))?;
    let report = result
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected build failure: {err}"))?;
    let built: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.project.to_string())
        .collect();

    if built != split_list(&projects) {
        return Err(eyre::eyre!("unexpected build order {built:?}"));
    }
    if !report.is_success() {
        return Err(eyre::eyre!("expected every build to succeed"));
    }
    Ok(())
}
