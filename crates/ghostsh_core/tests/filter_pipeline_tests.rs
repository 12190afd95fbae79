use ghostsh_core::{DataValue, ErrorKind, FilterRegistry, FilterStage, Table};
use proptest::prelude::*;

fn sample_listing() -> Table {
    let mut t = Table::new(&["Name", "Size", "Type"]).unwrap();
    t.add_row(vec![DataValue::string("a.txt"), DataValue::size("10 KB"), DataValue::string("File")]).unwrap();
    t.add_row(vec![DataValue::string("b"), DataValue::size("0 B"), DataValue::string("Directory")]).unwrap();
    t.add_row(vec![DataValue::string("big.bin"), DataValue::size("5 MB"), DataValue::string("File")]).unwrap();
    t
}

fn stages(line: &str) -> Vec<FilterStage> {
    line.split('|').filter_map(FilterStage::parse).collect()
}

fn cells(t: &Table) -> Vec<Vec<String>> {
    t.rows().iter().map(|r| r.iter().map(|v| v.to_string()).collect()).collect()
}

#[test]
fn where_sort_limit_yields_two_largest_files() {
    let reg = FilterRegistry::standard();
    let out = reg
        .run_chain(sample_listing(), &stages("where Size > 1kb | sort-by Size desc | limit 2"))
        .unwrap();
    assert_eq!(
        cells(&out),
        vec![
            vec!["big.bin", "5 MB", "File"],
            vec!["a.txt", "10 KB", "File"],
        ]
    );
}

#[test]
fn unknown_field_aborts_whole_pipeline() {
    let reg = FilterRegistry::standard();
    let err = reg
        .run_chain(sample_listing(), &stages("sort-by Name | where Colour == red | limit 1"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownField);
    assert!(err.message.contains("Available fields: Name, Size, Type"));
}

#[test]
fn select_then_contains_on_projected_table() {
    let reg = FilterRegistry::standard();
    let out = reg
        .run_chain(sample_listing(), &stages("select Name,Type | contains name .bin"))
        .unwrap();
    assert_eq!(out.headers(), ["Name", "Type"]);
    assert_eq!(cells(&out), vec![vec!["big.bin", "File"]]);
}

#[test]
fn input_table_is_left_untouched() {
    let reg = FilterRegistry::standard();
    let input = sample_listing();
    let _ = reg.apply("sort-by", &input, &["Size".into(), "desc".into()]).unwrap();
    assert_eq!(input, sample_listing());
}

fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec((0i64..50, 0u64..4096), 0..40).prop_map(|rows| {
        let mut t = Table::new(&["PID", "Memory"]).unwrap();
        for (pid, kb) in rows {
            t.add_row(vec![DataValue::int(pid), DataValue::size(format!("{kb} KB"))]).unwrap();
        }
        t
    })
}

fn arb_op() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![">", "<", ">=", "<=", "=="])
}

proptest! {
    #[test]
    fn prop_refiltering_never_grows(t in arb_table(), op1 in arb_op(), op2 in arb_op(), a in 0i64..50, b in 0u64..4096) {
        let first = t.filter_table("PID", op1, &a.to_string()).unwrap();
        let second = first.filter_table("Memory", op2, &format!("{b}kb")).unwrap();
        prop_assert!(first.row_count() <= t.row_count());
        prop_assert!(second.row_count() <= first.row_count());
        for row in second.rows() {
            prop_assert!(first.rows().contains(row));
        }
    }

    #[test]
    fn prop_complement_filter_reintroduces_nothing(t in arb_table(), a in 0i64..50) {
        let above = t.filter_table("PID", ">", &a.to_string()).unwrap();
        let complement = above.filter_table("PID", "<=", &a.to_string()).unwrap();
        prop_assert_eq!(complement.row_count(), 0);
    }

    #[test]
    fn prop_limit_at_or_above_row_count_is_identity(t in arb_table(), extra in 0usize..5) {
        let n = t.row_count() + extra;
        prop_assume!(n > 0);
        let out = FilterRegistry::standard().apply("limit", &t, &[n.to_string()]).unwrap();
        prop_assert_eq!(out, t);
    }
}
