use super::*;
use custody_api::fs_store::create_fs_store;

pub(crate) fn exec(config: KeyToolConfig, mode: Mode) -> CustodyResult<()> {
    let runner = TaskRunner::new(config, mode, create_fs_store())
        .map_err(one_err::OneErr::new)?;

    let report = runner.run().map_err(one_err::OneErr::new)?;

    println!("# custody-keytool {mode}: {report}");
    println!("DONE");

    Ok(())
}
