use anyhow::Result;
use zivpn_core::AppCore;

use crate::output::OutputFormat;
use crate::output::table::print_fields;

pub fn run(core: &AppCore, format: OutputFormat) -> Result<()> {
    let info = core.system_info()?;

    format.emit(&info, |info| {
        print_fields(&[
            ("Domain", info.domain.clone()),
            ("Listen", info.listen.clone()),
            ("API port", info.api_port.to_string()),
            ("Credentials", info.credential_count.to_string()),
            ("Active", info.active_count.to_string()),
            ("Expired", info.expired_count.to_string()),
        ])
    })
}
