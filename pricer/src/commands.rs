use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use pricing::profile::{spot_ladder, strike_grid};
use pricing::{
    evaluate_records, BlackScholesMerton, BoundaryContext, FailurePolicy, Greek, GreeksResult,
    OptionParameters, OptionRecord, OptionType, PricedOption, Sensitivities,
};
use tracing::{info, warn};

pub fn quote(
    engine: &BlackScholesMerton,
    record: &OptionRecord,
    ctx: &BoundaryContext,
) -> Result<GreeksResult> {
    let dp = record
        .to_parameters(ctx)
        .context("attribute missing, please check your input")?;
    info!(
        option_type = %dp.option_type,
        strike = dp.strike,
        spot = dp.asset_price,
        years = dp.time_to_expiration,
        "pricing single option"
    );
    Ok(engine.greeks(&dp)?)
}

pub fn write_quote<W: Write>(mut out: W, greeks: &GreeksResult) -> Result<()> {
    writeln!(out, "Price: {}", greeks.price)?;
    writeln!(out, "Delta: {}", greeks.delta)?;
    writeln!(out, "Gamma: {}", greeks.gamma)?;
    writeln!(out, "Vega:  {}", greeks.vega)?;
    writeln!(out, "Theta: {}", greeks.theta)?;
    Ok(())
}

pub fn read_records<R: Read>(input: R) -> Result<Vec<OptionRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);
    reader
        .deserialize::<OptionRecord>()
        .enumerate()
        .map(|(line, row)| row.with_context(|| format!("malformed option record {}", line + 1)))
        .collect()
}

pub fn write_rows<W: Write>(out: W, rows: &[PricedOption]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn batch(
    engine: &BlackScholesMerton,
    ctx: &BoundaryContext,
    input: &Path,
    output: Option<&Path>,
    policy: FailurePolicy,
) -> Result<()> {
    let file = File::open(input).with_context(|| format!("could not open {}", input.display()))?;
    let records = read_records(file)?;
    let report = evaluate_records(engine, &records, ctx);
    for failure in report.failures() {
        warn!(
            index = failure.index,
            ticker = %failure.record.ticker,
            error = %failure.error,
            "option not priced"
        );
    }
    let rows = report.rows(policy);
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("could not create {}", path.display()))?;
            write_rows(file, &rows)?;
            info!(rows = rows.len(), path = %path.display(), "results written");
        }
        None => write_rows(io::stdout().lock(), &rows)?,
    }
    Ok(())
}

pub struct ProfileRequest {
    pub option_type: OptionType,
    /// one output column per strike
    pub strikes: Vec<f64>,
    pub maturity_years: f64,
    pub volatility: f64,
    pub greek: Greek,
    pub from: f64,
    pub to: f64,
    pub step: f64,
}

pub fn profile<W: Write>(
    engine: &BlackScholesMerton,
    ctx: &BoundaryContext,
    request: &ProfileRequest,
    out: W,
) -> Result<()> {
    let first = match request.strikes.first() {
        Some(&strike) => strike,
        None => bail!("at least one strike is needed for a profile"),
    };
    let base = OptionParameters::with_defaults(
        request.option_type,
        first,
        first,
        request.maturity_years,
        request.volatility,
        &ctx.defaults,
    );
    let spots = spot_ladder(request.from, request.to, request.step)?;
    let grid = strike_grid(engine, &base, &request.strikes, &spots, request.greek)?;
    info!(
        greek = ?request.greek,
        strikes = request.strikes.len(),
        spots = spots.len(),
        "profile evaluated"
    );

    let mut writer = csv::Writer::from_writer(out);
    let header = std::iter::once("spot".to_owned())
        .chain(request.strikes.iter().map(|strike| format!("K={strike}")));
    writer.write_record(header)?;
    for (spot, column) in spots.iter().zip(grid.columns()) {
        let row = std::iter::once(spot.to_string()).chain(column.iter().map(f64::to_string));
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
