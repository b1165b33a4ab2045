//! Convert command implementation

use crate::cli::ConvertArgs;
use crate::output::OutputWriter;
use crate::output_types::ConvertOutput;
use anyhow::{Context, Result};
use geotag_core::models::Axis;
use geotag_geo::{parse_coordinate, to_hemisphere_tagged};

pub fn execute(args: ConvertArgs, output: &OutputWriter) -> Result<()> {
    let axis = Axis::from(args.axis);
    let input = args.value.trim();

    let decimal = parse_coordinate(input, axis)
        .with_context(|| format!("Cannot convert '{}'", input))?;
    let hemisphere_tagged = to_hemisphere_tagged(decimal, axis)
        .with_context(|| format!("Cannot convert '{}'", input))?;

    if output.is_json() {
        output.result(ConvertOutput {
            axis: axis.to_string(),
            input: input.to_string(),
            hemisphere_tagged,
            decimal,
        })?;
    } else {
        output.kv("Axis", axis);
        output.kv("Hemisphere-tagged", hemisphere_tagged);
        output.kv("Decimal", decimal);
    }

    Ok(())
}
