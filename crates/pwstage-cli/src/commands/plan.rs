//! `pwstage plan`: preview one file's transfer.

use pwstage_core::{DataFile, DataManager, Direction, TransferPlan};

use crate::cli::PlanArgs;
use crate::error::{CliError, CliResult};

pub(crate) fn handle_plan(manager: &DataManager, args: PlanArgs) -> CliResult<i32> {
    let mut file = DataFile::parse(&args.uri).map_err(CliError::stage)?;
    if let Some(local) = args.local {
        file = file.with_local_path(local);
    }
    let direction = Direction::from(args.direction);
    let plan = manager
        .plan(&args.executor, &mut file, direction)
        .map_err(CliError::stage)?;

    for line in render_plan(&file, direction, &plan) {
        println!("{line}");
    }
    Ok(0)
}

fn render_plan(file: &DataFile, direction: Direction, plan: &TransferPlan) -> Vec<String> {
    let local = file
        .local_path
        .as_ref()
        .map_or_else(String::new, |path| path.display().to_string());
    let mut lines = vec![
        format!("remote: {file}"),
        format!("local: {local}"),
        format!("direction: {direction}"),
    ];
    lines.extend(plan.render_lines().into_iter().map(|line| format!("  {line}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwstage_core::TransferCommand;

    #[test]
    fn plan_lines_list_commands_in_order() -> anyhow::Result<()> {
        let file = DataFile::parse("file:///srv/in.txt")?.with_local_path("/work/in.txt");
        let transfer = TransferCommand::new("rsync").args(["h:/srv/in.txt", "/work/in.txt"]);
        let plan =
            TransferPlan::single(transfer).with_preflight(TransferCommand::new("ssh").arg("h"));
        assert_eq!(
            render_plan(&file, Direction::In, &plan),
            vec![
                "remote: file:///srv/in.txt",
                "local: /work/in.txt",
                "direction: in",
                "  ssh h",
                "  rsync h:/srv/in.txt /work/in.txt",
            ]
        );
        Ok(())
    }
}
