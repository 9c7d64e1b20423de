mod common;

use std::cell::RefCell;

use common::{only_failure, quiet};
use verdict::host::{HostConfig, Status};
use verdict::value::{Inspect, Record, Value};
use verdict::{host, table, Assert};

struct Case {
    name: &'static str,
    input: &'static str,
    want: Option<i64>,
}

impl Inspect for Case {
    fn to_value(&self) -> Value {
        Record::of::<Self>()
            .field("Name", self.name)
            .field("Input", self.input)
            .field("Want", &self.want)
            .finish()
    }
}

fn case(name: &'static str, input: &'static str, want: Option<i64>) -> Case {
    Case { name, input, want }
}

#[test]
fn runs_one_subtest_per_entry_in_order() {
    let cases = vec![
        case("positive", "42", Some(42)),
        case("negative", "-7", Some(-7)),
        case("garbage", "x", None),
    ];
    let seen = RefCell::new(Vec::new());
    let outcome = quiet("parse", |t| {
        table::run(t, &cases, |a, i| {
            seen.borrow_mut().push((a.handle().name().to_string(), i));
            a.that(cases[i].input.parse::<i64>().ok()).equals(cases[i].want);
        });
    });
    outcome.assert_passed();
    assert_eq!(
        *seen.borrow(),
        vec![
            ("parse/positive".to_string(), 0),
            ("parse/negative".to_string(), 1),
            ("parse/garbage".to_string(), 2),
        ]
    );
    let names: Vec<_> = outcome.subtests.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["parse/positive", "parse/negative", "parse/garbage"]);
}

#[test]
fn a_failing_entry_does_not_stop_its_siblings() {
    let cases = [
        case("ok", "1", Some(1)),
        case("wrong", "2", Some(3)),
        case("also ok", "4", Some(4)),
    ];
    let outcome = quiet("siblings", |t| {
        Assert::new(t).table(&cases, |a, i| {
            a.that(cases[i].input.parse::<i64>().ok()).equals(cases[i].want);
        });
    });
    assert!(outcome.failed());
    let statuses: Vec<_> = outcome.subtests.iter().map(|s| s.status).collect();
    assert_eq!(statuses, [Status::Passed, Status::Failed, Status::Passed]);
    assert!(only_failure(&outcome).contains("* 2 != 3"));
}

#[test]
fn naming_errors_fail_before_any_subtest_runs() {
    let cases = vec![case("a", "", None), case("", "", None), case("a", "", None)];
    let ran = RefCell::new(0);
    let outcome = quiet("naming", |t| {
        table::run(t, &cases, |_, _| *ran.borrow_mut() += 1);
    });
    assert_eq!(*ran.borrow(), 0);
    assert!(outcome.subtests.is_empty());
    assert_eq!(
        outcome.failures,
        vec!["table[1]: `Name` must not be empty\n\
              table[2]: duplicate `Name` \"a\", first used by table[0]\n    \
              code: verdict::table::invalid_entries\n    \
              help: every entry needs a unique, non-empty `Name`"
            .to_string()]
    );
}

#[test]
fn structural_errors_are_reported_alone() {
    let rows = vec![Record::new("Row").field("Title", "x").finish(), Value::Nil];
    let outcome = quiet("shape", |t| {
        table::run(t, &rows, |_, _| {});
    });
    assert_eq!(
        outcome.failures,
        vec!["table[0]: Row has no `Name` field\n    \
              code: verdict::table::missing_name_field\n    \
              help: add a `Name` field holding the sub-test name"
            .to_string()]
    );
}

#[test]
fn non_sequence_table_is_rejected() {
    let outcome = quiet("container", |t| {
        table::run(t, &case("solo", "", None), |_, _| {});
    });
    assert_eq!(
        outcome.failures,
        vec!["table must be a slice or array of structs, got Case\n    \
              code: verdict::table::invalid_container\n    \
              help: pass a Vec, slice or array of records"
            .to_string()]
    );
}

#[test]
fn empty_table_runs_nothing() {
    let outcome = quiet("empty", |t| {
        table::run(t, &Vec::<Case>::new(), |_, _| unreachable!());
    });
    outcome.assert_passed();
    assert!(outcome.subtests.is_empty());
}

#[test]
fn filter_selects_entries_by_full_name() {
    let cases = [case("first", "", None), case("second", "", None)];
    let config = HostConfig::plain().with_filter("filtered/second");
    let outcome = host::run_with(&config, "filtered", |t| {
        table::run(t, &cases, |a, _| {
            a.that(a.handle().name()).equals("filtered/second");
        });
    });
    outcome.assert_passed();
    assert_eq!(outcome.find("first").map(|o| o.status), Some(Status::Skipped));
    assert_eq!(outcome.find("second").map(|o| o.status), Some(Status::Passed));
}

#[test]
fn nested_runs_inherit_the_configuration() {
    let outcome = quiet("outer", |t| {
        let a = Assert::new(t);
        let passed = a.run("inner", |a| {
            a.that(a.handle().name()).equals("outer/inner");
        });
        a.that(passed).is_true();
    });
    outcome.assert_passed();
    assert!(outcome.find("outer/inner").is_some_and(|o| o.passed()));
}
