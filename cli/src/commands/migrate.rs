use anyhow::Context;
use flowtally_common::config::Config;
use flowtally_core::store::SqliteCounterStore;

use crate::terminal::print;

pub fn migrate(cfg: &Config) -> anyhow::Result<()> {
    print::header("migrating counter store");

    let store = SqliteCounterStore::open(&cfg.sqlite_dsn)
        .with_context(|| format!("cannot open counter store {:?}", cfg.sqlite_dsn))?;
    let version = store.schema_version()?;

    print::aligned_line("database", &cfg.sqlite_dsn);
    print::aligned_line("schema", version);
    print::end_of_program();
    Ok(())
}
