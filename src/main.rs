use std::error::Error;
use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

use csvtable::cli::{Cli, OutputFormat};
use csvtable::storage::table::Table;

fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(&cli, &mut out) {
        report_error(&mut io::stderr(), &*e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let table = cli.csv_reader()?.read_file(&cli.path)?;

    if cli.info {
        print_info(&table, out)?;
    } else if let Some(name) = &cli.column {
        for value in table.column_by_name(name)? {
            writeln!(out, "{}", value)?;
        }
    } else if let Some(cell) = &cli.cell {
        writeln!(out, "{}", cell.resolve(&table)?)?;
    } else {
        match cli.format {
            OutputFormat::Table => print_table(&table, out)?,
            OutputFormat::Csv => print_csv(&table, out)?,
            OutputFormat::Json => print_json(&table, out)?,
        }
    }

    out.flush()?;
    Ok(())
}

fn report_error(out: &mut impl Write, err: &dyn Error) {
    let _ = writeln!(out, "Error: {}", err);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_info(table: &Table, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    writeln!(out, "header: {}", table.header()?)?;
    writeln!(out, "columns: {}", table.column_count()?)?;
    writeln!(out, "rows: {}", table.row_count()?)?;
    writeln!(out, "total rows: {}", table.total_row_count()?)?;
    Ok(())
}

fn print_table(table: &Table, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let header = table.header()?;
    let rows = table.rows()?;

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let max_value_width = rows
                .iter()
                .map(|row| row.get(i).map(|v| v.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            name.chars().count().max(max_value_width)
        })
        .collect();

    let line: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{:width$}", name, width = widths[i]))
        .collect();
    writeln!(out, "{}", line.join(" | "))?;

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(out, "{}", sep.join("-+-"))?;

    for row in rows {
        let values: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:width$}", v, width = widths[i]))
            .collect();
        writeln!(out, "{}", values.join(" | "))?;
    }

    writeln!(out, "({} rows)", rows.len())?;
    Ok(())
}

fn print_csv(table: &Table, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(&mut *out);
    for row in table.all_rows()? {
        writer.write_record(row.as_slice())?;
    }
    writer.flush()?;
    Ok(())
}

// Objects keep header order; a duplicated key keeps the first column's value.
fn print_json(table: &Table, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let header = table.header()?;
    let records: Vec<serde_json::Value> = table
        .rows()?
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for (key, value) in header.iter().zip(row.iter()) {
                object
                    .entry(key)
                    .or_insert_with(|| serde_json::Value::String(value.to_string()));
            }
            serde_json::Value::Object(object)
        })
        .collect();

    writeln!(out, "{}", serde_json::to_string(&records)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use csvtable::storage::TextSource;
    use std::path::PathBuf;

    fn sample_path() -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("samples")
            .join("simple.csv")
            .to_string_lossy()
            .to_string()
    }

    fn render(print: fn(&Table, &mut dyn Write) -> Result<(), Box<dyn Error>>, table: &Table) -> String {
        let mut out = Vec::new();
        print(table, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn run_args(args: &[&str]) -> Result<String, Box<dyn Error>> {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        run(&cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_print_json_keeps_header_order() {
        let table = Table::from_rows(vec![
            vec!["name", "mail", "phone", "requirement"],
            vec!["Nur", "nur@mail.com", "+880", "Web"],
        ])
        .unwrap();

        assert_eq!(
            render(print_json, &table),
            "[{\"name\":\"Nur\",\"mail\":\"nur@mail.com\",\"phone\":\"+880\",\"requirement\":\"Web\"}]\n"
        );
    }

    #[test]
    fn test_print_json_duplicate_key_keeps_first() {
        let table = Table::from_rows(vec![vec!["id", "note", "id"], vec!["1", "x", "2"]]).unwrap();
        assert_eq!(render(print_json, &table), "[{\"id\":\"1\",\"note\":\"x\"}]\n");
    }

    #[test]
    fn test_print_csv_round_trips_quoted_fields() {
        let table = Table::from_text(
            "name,description\n\"Doe, John\",\"A \"\"quoted\"\" value\"\nplain,\"two\nlines\"\n",
            TextSource::Content,
        )
        .unwrap();

        let printed = render(print_csv, &table);
        let reparsed = Table::from_text(&printed, TextSource::Content).unwrap();

        assert_eq!(reparsed.header().unwrap(), table.header().unwrap());
        assert_eq!(reparsed.rows().unwrap(), table.rows().unwrap());
        assert_eq!(reparsed.value_by_name("name", 0).unwrap(), "Doe, John");
        assert_eq!(reparsed.value_by_name("description", 0).unwrap(), "A \"quoted\" value");
    }

    #[test]
    fn test_print_info() {
        let table = Table::from_rows(vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]).unwrap();
        assert_eq!(
            render(print_info, &table),
            "header: [a, b]\ncolumns: 2\nrows: 2\ntotal rows: 3\n"
        );
    }

    #[test]
    fn test_print_table() {
        let table = Table::from_rows(vec![vec!["id", "city"], vec!["1", "Oslo"], vec!["22", "Rome"]]).unwrap();
        assert_eq!(
            render(print_table, &table),
            "id | city\n---+-----\n1  | Oslo\n22 | Rome\n(2 rows)\n"
        );
    }

    #[test]
    fn test_run_selectors() {
        let path = sample_path();
        assert_eq!(
            run_args(&["csvtable", path.as_str(), "--cell", "1, requirement"]).unwrap(),
            "Need a iOS App\n"
        );
        assert_eq!(run_args(&["csvtable", path.as_str(), "--cell", "0,0"]).unwrap(), "Nurujjaman Pollob\n");
        assert_eq!(
            run_args(&["csvtable", path.as_str(), "--column", "name"]).unwrap(),
            "Nurujjaman Pollob\nJohn Doe\n"
        );
        assert!(run_args(&["csvtable", path.as_str(), "--info"]).unwrap().contains("total rows: 3"));
    }

    #[test]
    fn test_error_reports_message() {
        let path = sample_path();
        let err = run_args(&["csvtable", path.as_str(), "--column", "nope"]).unwrap_err();

        let mut out = Vec::new();
        report_error(&mut out, &*err);
        let message = String::from_utf8(out).unwrap();

        assert_eq!(message, "Error: The key nope is not found in the key-set\n");
        assert!(!message.contains("KeyNotFound"));
    }

    #[test]
    fn test_error_reports_bad_delimiter() {
        let path = sample_path();
        let err = run_args(&["csvtable", path.as_str(), "-d", "é"]).unwrap_err();

        let mut out = Vec::new();
        report_error(&mut out, &*err);
        assert!(String::from_utf8(out).unwrap().starts_with("Error: delimiter must be a single ASCII character"));
    }
}
