//! Canned psql answers for the interactive shell.

use super::shell::LineKind;

const HELP: &str = r#"You are using psql, the command-line interface to PostgreSQL.
Type:  \copyright for distribution terms
       \h for help with SQL commands
       \? for help with psql commands
       \g or terminate with semicolon to execute query
       \q to quit"#;

const LIST_DATABASES: &str = r#"                                  List of databases
   Name    |  Owner   | Encoding |   Collate   |    Ctype    |   Access privileges
-----------+----------+----------+-------------+-------------+-----------------------
 postgres  | postgres | UTF8     | en_US.UTF-8 | en_US.UTF-8 |
 template0 | postgres | UTF8     | en_US.UTF-8 | en_US.UTF-8 | =c/postgres          +
           |          |          |             |             | postgres=CTc/postgres
 template1 | postgres | UTF8     | en_US.UTF-8 | en_US.UTF-8 | =c/postgres          +
           |          |          |             |             | postgres=CTc/postgres
(3 rows)"#;

const LIST_RELATIONS: &str = r#"         List of relations
 Schema | Name  | Type  |  Owner
--------+-------+-------+----------
 public | users | table | postgres
(1 row)"#;

const SELECT_USERS: &str = r#" id |   name   |       email
----+----------+--------------------
  1 | John Doe | john@example.com
  2 | Jane Doe | jane@example.com
(2 rows)"#;

const BACKSLASH_HELP: &str = r#"General
  \copyright             show PostgreSQL usage and distribution terms
  \g [FILE] or ;         execute query (and send results to file or |pipe)
  \h [NAME]              help on syntax of SQL commands, * for all commands
  \q                     quit psql

Informational
  \l[+]   [PATTERN]      list databases
  \dt[S+] [PATTERN]      list tables"#;

/// Answer one line typed at the prompt. `None` for blank input.
pub fn respond(input: &str) -> Option<(LineKind, String)> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let reply = match normalized.as_str() {
        "help" => (LineKind::Result, HELP.to_string()),
        "\\q" => (LineKind::Info, "Connection closed.".to_string()),
        "\\l" | "\\list" => (LineKind::Result, LIST_DATABASES.to_string()),
        "\\dt" => (LineKind::Result, LIST_RELATIONS.to_string()),
        other if other.contains("select") => (LineKind::Result, SELECT_USERS.to_string()),
        "\\?" => (LineKind::Result, BACKSLASH_HELP.to_string()),
        _ => (
            LineKind::Result,
            format!("ERROR:  syntax error at or near \"{input}\""),
        ),
    };
    Some(reply)
}
