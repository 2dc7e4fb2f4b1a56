use std::io::Write;

use tempfile::TempDir;
use xtab::{Engine, Error, Row, Value};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path.to_str().unwrap().to_owned()
}

fn drain(table: &xtab::Table) -> Vec<Row> {
    let mut cursor = table.scan().expect("scan");
    let mut rows = Vec::new();
    while let Some(row) = cursor.next_row().expect("row") {
        rows.push(row);
    }
    rows
}

#[test]
fn csv_module_with_header_and_typed_declarations() {
    xtab_test_utils::init_tracing_for_tests();
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "s.csv", "id,name\n1,alex\n");
    let filename = format!("filename='{path}'");

    // Untyped: header names the columns, everything reads as text.
    let table = engine.create_table("csv", "people", &[&filename]).unwrap();
    let rows = drain(&table);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rowid, 1);
    assert_eq!(
        rows[0].values,
        [Value::Text("1".into()), Value::Text("alex".into())]
    );

    // Typed declarations coerce, with header consumption made explicit.
    let table = engine
        .create_table(
            "csv",
            "people_typed",
            &[&filename, "header='yes'", "id integer", "name text"],
        )
        .unwrap();
    let rows = drain(&table);
    assert_eq!(
        rows[0].values,
        [Value::Integer(1), Value::Text("alex".into())]
    );
}

#[test]
fn tsv_module_binds_the_tab_delimiter() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "s.tsv", "id\tname\n1\talex\n");
    let filename = format!("filename='{path}'");

    let table = engine.create_table("tsv", "people", &[&filename]).unwrap();
    let rows = drain(&table);
    assert_eq!(
        rows[0].values,
        [Value::Text("1".into()), Value::Text("alex".into())]
    );
}

#[test]
fn xsv_module_requires_a_delimiter() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "s.psv", "id|name\n1|alex\n");
    let filename = format!("filename='{path}'");

    let err = engine.create_table("xsv", "pipes", &[&filename]).unwrap_err();
    assert!(err.to_string().contains("no delimiter given"));

    let table = engine
        .create_table("xsv", "pipes", &[&filename, "delimiter='|'"])
        .unwrap();
    let rows = drain(&table);
    assert_eq!(rows[0].values, [Value::Text("1".into()), Value::Text("alex".into())]);
}

#[test]
fn inferred_name_mode_uses_the_table_name_as_a_path() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "inferred.csv", "id\n1\n");

    let table = engine.create_table("csv", &path, &[]).unwrap();
    assert_eq!(drain(&table).len(), 1);

    let err = engine
        .create_table("csv", "no_such_table", &[])
        .unwrap_err();
    assert!(err.to_string().contains("no filename given"));
}

#[test]
fn missing_file_and_empty_glob_fail_at_creation() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();

    let missing = format!("filename='{}'", dir.path().join("nope.csv").display());
    assert!(matches!(
        engine.create_table("csv", "t", &[&missing]).unwrap_err(),
        Error::SourceNotFound(_)
    ));

    let empty = format!("filename='{}'", dir.path().join("*.csv").display());
    assert!(matches!(
        engine.create_table("csv", "t", &[&empty]).unwrap_err(),
        Error::GlobNoMatch(_)
    ));
}

#[test]
fn glob_scan_with_provenance_functions() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "a.csv", "id,name\n1,alex\n2,brian\n");
    write_file(&dir, "b.csv", "id,name\n3,carol\n");
    let pattern = format!("filename='{}'", dir.path().join("*.csv").display());

    let table = engine.create_table("csv", "all", &[&pattern]).unwrap();
    let rows = drain(&table);
    assert_eq!(
        rows.iter().map(|r| r.rowid).collect::<Vec<_>>(),
        [1, 2, 3]
    );

    for row in &rows {
        let path = engine
            .call_table_scalar("csv_path", table.id(), &[Value::Integer(row.rowid)])
            .unwrap();
        assert_eq!(path.as_text(), Some(row.path.as_ref()));

        let line = engine
            .call_table_scalar("csv_line_number", table.id(), &[Value::Integer(row.rowid)])
            .unwrap();
        assert_eq!(line.as_integer(), Some(row.line as i64));
    }

    // Unknown rowids resolve to NULL, not an error.
    let missing = engine
        .call_table_scalar("csv_path", table.id(), &[Value::Integer(99)])
        .unwrap();
    assert!(missing.is_null());
}

#[test]
fn compressed_files_scan_identically_to_plain_ones() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let contents = "id,name\n1,alex\n2,brian\n";
    let plain = write_file(&dir, "s.csv", contents);

    let gz_path = dir.path().join("s.csv.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(&gz_path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let zst_path = dir.path().join("s.csv.zst");
    std::fs::write(&zst_path, zstd::encode_all(contents.as_bytes(), 0).unwrap()).unwrap();

    let strip = |rows: Vec<Row>| -> Vec<(i64, Vec<Value>, u64)> {
        rows.into_iter()
            .map(|row| (row.rowid, row.values, row.line))
            .collect()
    };

    let plain_arg = format!("filename='{plain}'");
    let gz_arg = format!("filename='{}'", gz_path.display());
    let zst_arg = format!("filename='{}'", zst_path.display());

    let baseline = strip(drain(&engine.create_table("csv", "p", &[&plain_arg]).unwrap()));
    let gz = strip(drain(&engine.create_table("csv", "g", &[&gz_arg]).unwrap()));
    let zst = strip(drain(&engine.create_table("csv", "z", &[&zst_arg]).unwrap()));
    assert_eq!(baseline, gz);
    assert_eq!(baseline, zst);
}

#[test]
fn reader_form_scans_two_paths_in_one_query_shape() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let one = write_file(&dir, "one.csv", "1,alex\n2,brian\n");
    let two = write_file(&dir, "two.csv", "3,carol\n");

    let reader = engine
        .create_reader("csv_reader", "people", &["id integer", "name text"])
        .unwrap();

    // Correlated-join shape: same declared table, different path per call.
    let mut seen = Vec::new();
    for path in [&one, &two] {
        let mut cursor = reader.scan_path(path).unwrap();
        let mut batch = Vec::new();
        while let Some(row) = cursor.next_row().unwrap() {
            batch.push(row);
        }
        assert_eq!(batch.first().map(|r| r.rowid), Some(1));
        seen.extend(batch);
    }
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2].values[0], Value::Integer(3));
}

#[test]
fn reader_rejects_filename_and_pathless_calls() {
    let engine = Engine::new();
    let err = engine
        .create_reader("csv_reader", "people", &["filename='x.csv'", "id integer"])
        .unwrap_err();
    assert!(err.to_string().contains("per call"));

    let reader = engine
        .create_reader("csv_reader", "people", &["id integer"])
        .unwrap();
    assert!(matches!(reader.scan().unwrap_err(), Error::MissingArgument(_)));
    assert!(matches!(
        reader.scan_path("").unwrap_err(),
        Error::MissingArgument(_)
    ));
}

#[test]
fn records_form_preserves_raw_text() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "s.csv", "a,b,c\nx,y,z\n");

    let records = engine.create_records("csv_records", "raw", &[]).unwrap();
    let mut cursor = records.scan_path(&path).unwrap();

    let first = cursor.next_record().unwrap().unwrap();
    assert_eq!((first.rowid, first.record.as_str()), (0, "a,b,c\n"));
    let second = cursor.next_record().unwrap().unwrap();
    assert_eq!((second.rowid, second.record.as_str()), (1, "x,y,z\n"));
    assert!(cursor.next_record().unwrap().is_none());

    // The generic form needs its delimiter for quoting decisions, and then
    // behaves identically.
    let err = engine.create_records("xsv_records", "raw", &[]).unwrap_err();
    assert!(err.to_string().contains("no delimiter given"));

    let generic = engine
        .create_records("xsv_records", "raw", &["delimiter=','"])
        .unwrap();
    let mut cursor = generic.scan_path(&path).unwrap();
    let first = cursor.next_record().unwrap().unwrap();
    assert_eq!((first.rowid, first.record.as_str()), (0, "a,b,c\n"));
}

#[test]
fn field_at_round_trips_with_full_parsing() {
    let engine = Engine::new();
    let record = "a,\"b,with delim\",\"c \"\"quoted\"\"\"";
    let options = xtab::SplitOptions::default();
    let fields = xtab::split_fields(record, &options);

    for (i, field) in fields.iter().enumerate() {
        let got = engine
            .call_scalar(
                "csv_field_at",
                &[Value::from(record), Value::from(i as i64)],
            )
            .unwrap();
        assert_eq!(got.as_text(), Some(field.as_str()));
    }
    let beyond = engine
        .call_scalar(
            "csv_field_at",
            &[Value::from(record), Value::from(fields.len() as i64)],
        )
        .unwrap();
    assert!(beyond.is_null());

    let generic = engine
        .call_scalar(
            "xsv_field_at",
            &[Value::from("a|b|c"), Value::from(2), Value::from("|")],
        )
        .unwrap();
    assert_eq!(generic.as_text(), Some("c"));
}

#[test]
fn version_and_debug_functions() {
    let engine = Engine::new();
    let version = engine.call_scalar("xsv_version", &[]).unwrap();
    let version = version.as_text().unwrap();
    assert!(version.starts_with('v'));
    assert_eq!(version.trim_start_matches('v').split('.').count(), 3);

    let debug = engine.call_scalar("xsv_debug", &[]).unwrap();
    assert_eq!(debug.as_text().unwrap().lines().count(), 2);
}

#[test]
fn provenance_functions_need_a_table_context() {
    let engine = Engine::new();
    let err = engine
        .call_scalar("csv_line_number", &[Value::Integer(1)])
        .unwrap_err();
    assert!(err.to_string().contains("table scan context"));

    let err = engine.call_scalar("nope", &[]).unwrap_err();
    assert!(err.to_string().contains("not a known function"));
}

#[test]
fn quote_override_is_honored_end_to_end() {
    let engine = Engine::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "s.csv", "name,notes\nalex,'a,quoted,note'\n");
    let filename = format!("filename='{path}'");

    let table = engine
        .create_table("csv", "quoted", &[&filename, "quote=\"'\""])
        .unwrap();
    let rows = drain(&table);
    assert_eq!(
        rows[0].values,
        [
            Value::Text("alex".into()),
            Value::Text("a,quoted,note".into())
        ]
    );
}
