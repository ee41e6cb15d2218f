// Regression tests: drive the `kacket` binary end to end.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn kacket() -> Command {
    Command::cargo_bin("kacket").unwrap()
}

#[test]
fn parse_prints_desugared_forms_from_stdin() {
    kacket()
        .args(["parse", "-"])
        .write_stdin("(define (f n) n)\n(let* ([a 1] [b a]) b)")
        .assert()
        .success()
        .stdout("(define f (lambda (n) n))\n(let ([a 1]) (let ([b a]) b))\n");
}

#[test]
fn parse_uses_builtin_extensions_unless_disabled() {
    let source = "(define-datatype t t? (v (x number?)))";
    kacket()
        .args(["parse", "-"])
        .write_stdin(source)
        .assert()
        .success()
        .stdout(contains("[v(x number?)]"));

    kacket()
        .args(["parse", "--no-std", "-"])
        .write_stdin(source)
        .assert()
        .success()
        .stdout(contains("(v (x number?))"));
}

#[test]
fn parse_json_emits_an_array() {
    kacket()
        .args(["parse", "--json", "-"])
        .write_stdin("(if p x)")
        .assert()
        .success()
        .stdout(contains("\"If\"").and(contains("\"condition\"")));
}

#[test]
fn tokens_lists_one_token_per_line() {
    kacket()
        .args(["tokens", "-"])
        .write_stdin("(f 1.5)")
        .assert()
        .success()
        .stdout("1:1\t`(`\n1:2\tsymbol `f`\n1:4\tnumber `1.5`\n1:7\t`)`\n");
}

#[test]
fn check_reports_form_count() {
    kacket()
        .args(["check", "-"])
        .write_stdin("(define x 1) x 'y")
        .assert()
        .success()
        .stdout(contains("<stdin> (3 forms)"));
}

#[test]
fn parse_errors_render_miette_diagnostics() {
    kacket()
        .args(["parse", "-"])
        .write_stdin("(define x 42")
        .assert()
        .failure()
        .stderr(contains("kacket::parse").and(contains("end of input")));
}

#[test]
fn lex_errors_render_miette_diagnostics() {
    kacket()
        .args(["tokens", "-"])
        .write_stdin("(f `x)")
        .assert()
        .failure()
        .stderr(contains("kacket::lex"));
}

#[test]
fn missing_file_fails() {
    kacket()
        .args(["check", "does/not/exist.rkt"])
        .assert()
        .failure();
}
