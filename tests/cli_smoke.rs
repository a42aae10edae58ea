use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn board_help_works() {
    Command::cargo_bin("board")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Task Board"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "init", "show", "move", "schedule", "shift", "assign", "members", "rm", "comment",
    ];

    for cmd in subcommands {
        Command::cargo_bin("board")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}
