use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use closebook_core::storage::{read_names, write_lookup_table};
use closebook_core::{resolve_names, InstrumentRef, MarketDataSource};

use crate::cli::ResolveArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ResolveResponseData {
    output: PathBuf,
    names: usize,
    resolved: Vec<InstrumentRef>,
    unmatched: Vec<String>,
}

pub async fn run<S>(args: &ResolveArgs, source: &S) -> Result<Value, CliError>
where
    S: MarketDataSource + ?Sized,
{
    if args.file_name.trim().is_empty() {
        return Err(CliError::Command(String::from("--file-name must not be empty")));
    }

    let names = read_names(&args.names)?;
    let report = resolve_names(source, &names, Some(args.kind.into())).await?;

    fs::create_dir_all(&args.out)?;
    let output = args.out.join(&args.file_name);
    write_lookup_table(&output, &report.resolved)?;
    info!(
        path = %output.display(),
        resolved = report.resolved.len(),
        unmatched = report.unmatched.len(),
        "wrote lookup table"
    );

    Ok(serde_json::to_value(ResolveResponseData {
        output,
        names: names.len(),
        resolved: report.resolved,
        unmatched: report.unmatched,
    })?)
}

#[cfg(test)]
mod tests {
    use closebook_core::storage::read_lookup_table;
    use closebook_core::TInvestAdapter;

    use super::*;
    use crate::cli::KindFilter;

    #[tokio::test]
    async fn offline_resolve_writes_share_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let names = dir.path().join("names");
        fs::write(&names, "Apple\n\nNobody Inc\nSberbank\n").expect("write names");

        let args = ResolveArgs {
            names,
            out: dir.path().join("out"),
            kind: KindFilter::Share,
            file_name: String::from("lookup.csv"),
        };
        let value = run(&args, &TInvestAdapter::default())
            .await
            .expect("resolve must succeed");

        assert_eq!(value["names"], 3);
        assert_eq!(value["unmatched"][0], "Nobody Inc");

        let lookup = read_lookup_table(&dir.path().join("out").join("lookup.csv"))
            .expect("lookup must parse");
        let figis = lookup
            .iter()
            .map(|instrument| instrument.figi.as_str())
            .collect::<Vec<_>>();
        assert_eq!(figis, vec!["BBG000B9XRY4", "BBG004730N88"]);
    }
}
