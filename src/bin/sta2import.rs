use clap::{crate_name, crate_version, value_t_or_exit, App, AppSettings, Arg};
use mt940_import::export::convert;
use mt940_import::parse_mt940;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

fn is_file(p: String) -> Result<(), String> {
    if Path::new(&p).is_file() {
        Ok(())
    } else {
        Err(format!(
            "Path '{}' doesn't exist or is not a regular file.",
            &p
        ))
    }
}

fn has_parent_dir(p: String) -> Result<(), String> {
    let parent_dir = if let Some(p) = Path::new(&p).parent() {
        p
    } else {
        return Err("Path doesn't have a parent dir.".into());
    };
    if parent_dir.is_dir() {
        Ok(())
    } else {
        Err(format!(
            "Path '{}' doesn't exist or is not a regular file.",
            &p
        ))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about(
            "Convert a MT940 statement to a generic bank import batch in JSON. \n\n\
             By default the output is the flat list of signed import transactions \
             that an accounting engine would consume. Use --raw to dump the parsed \
             statement model instead.",
        )
        .global_setting(AppSettings::ColoredHelp)
        .arg(
            Arg::with_name("raw")
                .short("r")
                .long("raw")
                .help("Dump the parsed MT940 model instead of the converted import batch."),
        )
        .arg(
            Arg::with_name("statement")
                .value_name("STATEMENT")
                .takes_value(true)
                .required(true)
                .validator(is_file)
                .help("Input mt940 statement"),
        )
        .arg(
            Arg::with_name("output")
                .value_name("OUTPUT")
                .takes_value(true)
                .validator(has_parent_dir)
                .help("Output file in JSON format"),
        )
        .get_matches();

    let dump_raw = matches.is_present("raw");
    let statement_input = value_t_or_exit!(matches, "statement", String);

    let input = fs::read_to_string(statement_input)?;
    let parsed = parse_mt940(&input)?;

    let json = if dump_raw {
        serde_json::to_string_pretty(&parsed)?
    } else {
        serde_json::to_string_pretty(&convert(&parsed))?
    };

    if matches.is_present("output") {
        // Write to a file.
        let output = value_t_or_exit!(matches, "output", String);
        fs::write(output, json)?;
    } else {
        // Write to stdout instead.
        io::stdout().write_all(json.as_bytes())?;
    };

    Ok(())
}
