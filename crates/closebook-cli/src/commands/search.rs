use serde::Serialize;
use serde_json::Value;

use closebook_core::{find_instruments, Instrument, MarketDataSource, ResolveOutcome};

use crate::cli::SearchArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SearchResponseData {
    query: String,
    matched: bool,
    results: Vec<Instrument>,
}

pub async fn run<S>(args: &SearchArgs, source: &S) -> Result<Value, CliError>
where
    S: MarketDataSource + ?Sized,
{
    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let outcome = find_instruments(source, query, args.kind.map(Into::into)).await?;
    let (matched, results) = match outcome {
        ResolveOutcome::NoMatch => (false, Vec::new()),
        ResolveOutcome::Matches(results) => (true, results),
    };

    Ok(serde_json::to_value(SearchResponseData {
        query: query.to_owned(),
        matched,
        results,
    })?)
}
