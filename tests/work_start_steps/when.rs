//! When steps for work orchestration BDD scenarios.

use super::world::{WorkWorld, run_async, split_list};
use liq_work::work::services::{BuildWorkRequest, StartWorkRequest};
use rstest_bdd_macros::when;

#[when(r#"work starts on issue "{issue}" in "{projects}""#)]
fn start_work(world: &mut WorkWorld, issue: String, projects: String) {
    let request = StartWorkRequest::new([issue]).with_projects(split_list(&projects));
    world.last_start_result = Some(run_async(world.orchestrator().start_work(request)));
}

#[when(r#"every project of work "{work_key}" is built"#)]
fn build_all(world: &mut WorkWorld, work_key: String) {
    let request = BuildWorkRequest::new().with_work_key(work_key).with_all(true);
    world.last_build_result = Some(run_async(world.orchestrator().build_work(request)));
}
