use crate::cli::CheckSetArgs;
use crate::error::Result;
use pdbench::workflows;
use tracing::info;

pub fn run(args: CheckSetArgs) -> Result<()> {
    info!(
        "Checking {:?} against training set {:?}",
        &args.dataset, &args.training_set
    );
    let report = workflows::check_set::run(&args.dataset, &args.training_set)?;
    print!("{}", report);
    Ok(())
}
