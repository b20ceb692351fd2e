use super::*;
use crate::config::{BuilderConfig, Dialect};
use crate::error::OrmError;
use crate::value::{Value, param};
use chrono::NaiveDate;
use std::sync::Arc;

fn qb(dialect: Dialect) -> QueryBuilder {
    BuilderConfig::new().dialect(dialect).query()
}

fn select_all(dialect: Dialect, table: &str) -> QueryBuilder {
    let mut qb = qb(dialect);
    qb.select(Vec::<&str>::new()).unwrap().from([table]).unwrap();
    qb
}

#[test]
fn test_identifier_quoting() {
    let cases = [
        (Dialect::MySql, "SELECT `u`.`id`, `name` AS `n` FROM `users` AS `u`"),
        (Dialect::Postgres, r#"SELECT "u"."id", "name" AS "n" FROM "users" AS "u""#),
        (Dialect::Sqlite, r#"SELECT "u"."id", "name" AS "n" FROM "users" AS "u""#),
        (Dialect::SqlServer, "SELECT [u].[id], [name] AS [n] FROM [users] AS [u]"),
    ];
    for (dialect, expected) in cases {
        let mut qb = qb(dialect);
        qb.select(["u.id", "name as n"]).unwrap().from(["users as u"]).unwrap();
        assert_eq!(qb.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_function_calls_are_not_quoted() {
    let mut qb = qb(Dialect::MySql);
    qb.select(["COUNT(*) AS total", "LOWER(email)"])
        .unwrap()
        .from(["users"])
        .unwrap();
    assert_eq!(
        qb.render().unwrap(),
        "SELECT COUNT(*) AS total, LOWER(email) FROM `users`"
    );
}

#[test]
fn test_parameter_markers() {
    let cases = [
        (Dialect::MySql, "SELECT * FROM `t` WHERE `id` = :id"),
        (Dialect::Postgres, r#"SELECT * FROM "t" WHERE "id" = $1"#),
        (Dialect::Sqlite, r#"SELECT * FROM "t" WHERE "id" = :id"#),
        (Dialect::SqlServer, "SELECT * FROM [t] WHERE [id] = @id"),
    ];
    for (dialect, expected) in cases {
        let mut qb = select_all(dialect, "t");
        qb.where_("id", "=", param("id")).unwrap();
        qb.bind_named("id", 1);
        assert_eq!(qb.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_bool_literals() {
    let cases = [
        (Dialect::MySql, "TRUE"),
        (Dialect::Postgres, "TRUE"),
        (Dialect::Sqlite, "1"),
        (Dialect::SqlServer, "1"),
    ];
    for (dialect, literal) in cases {
        let mut qb = select_all(dialect, "t");
        qb.where_("active", "=", true).unwrap();
        assert!(qb.render().unwrap().ends_with(&format!("= {literal}")), "{dialect}");
    }
}

#[test]
fn test_string_escaping() {
    let mut mysql = select_all(Dialect::MySql, "t");
    mysql.where_("path", "=", r"a\b'c").unwrap();
    assert_eq!(
        mysql.render().unwrap(),
        r"SELECT * FROM `t` WHERE `path` = 'a\\b''c'"
    );

    let mut pg = select_all(Dialect::Postgres, "t");
    pg.where_("path", "=", r"a\b'c").unwrap();
    assert_eq!(
        pg.render().unwrap(),
        r#"SELECT * FROM "t" WHERE "path" = 'a\b''c'"#
    );
}

#[test]
fn test_ilike_falls_back_to_like() {
    let mut mysql = select_all(Dialect::MySql, "t");
    mysql.where_("name", "ilike", "a%").unwrap();
    assert_eq!(mysql.render().unwrap(), "SELECT * FROM `t` WHERE `name` LIKE 'a%'");

    let mut sqlite = select_all(Dialect::Sqlite, "t");
    sqlite.where_("name", "ilike", "a%").unwrap();
    assert_eq!(
        sqlite.render().unwrap(),
        r#"SELECT * FROM "t" WHERE "name" LIKE 'a%'"#
    );

    let mut pg = select_all(Dialect::Postgres, "t");
    pg.where_("name", "ilike", "a%").unwrap();
    assert_eq!(
        pg.render().unwrap(),
        r#"SELECT * FROM "t" WHERE "name" ILIKE 'a%'"#
    );
}

#[test]
fn test_literal_formats() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let datetime = date.and_hms_opt(3, 4, 5).unwrap();
    let mut qb = select_all(Dialect::Postgres, "t");
    qb.where_("d", "=", date)
        .unwrap()
        .where_("ts", "<", datetime)
        .unwrap()
        .where_("score", ">=", 2.5)
        .unwrap();
    assert_eq!(
        qb.render().unwrap(),
        r#"SELECT * FROM "t" WHERE "d" = '2024-01-02' AND "ts" < '2024-01-02 03:04:05' AND "score" >= 2.5"#
    );

    let mut qb = select_all(Dialect::Postgres, "t");
    qb.where_("score", "=", f64::NAN).unwrap();
    assert!(qb.render().unwrap_err().is_compile());
}

// ==================== Pagination ====================

#[test]
fn test_offset_without_limit() {
    let cases = [
        (Dialect::MySql, "SELECT * FROM `t` LIMIT 18446744073709551615 OFFSET 5"),
        (Dialect::Postgres, r#"SELECT * FROM "t" OFFSET 5"#),
        (Dialect::Sqlite, r#"SELECT * FROM "t" LIMIT -1 OFFSET 5"#),
        (Dialect::SqlServer, "SELECT * FROM [t] ORDER BY (SELECT 0) OFFSET 5 ROWS"),
    ];
    for (dialect, expected) in cases {
        let mut qb = select_all(dialect, "t");
        qb.offset(5);
        assert_eq!(qb.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_sqlserver_pagination() {
    let mut top = select_all(Dialect::SqlServer, "t");
    top.distinct().limit(10);
    assert_eq!(top.render().unwrap(), "SELECT DISTINCT TOP 10 * FROM [t]");

    let mut unordered = select_all(Dialect::SqlServer, "t");
    unordered.limit(10).offset(20);
    assert_eq!(
        unordered.render().unwrap(),
        "SELECT * FROM [t] ORDER BY (SELECT 0) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );

    let mut ordered = select_all(Dialect::SqlServer, "t");
    ordered.oldest("id").unwrap().limit(10).offset(20);
    assert_eq!(
        ordered.render().unwrap(),
        "SELECT * FROM [t] ORDER BY [id] ASC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_negative_offset_is_rejected() {
    for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite, Dialect::SqlServer] {
        let mut qb = select_all(dialect, "t");
        qb.offset(-3);
        assert!(qb.render().unwrap_err().is_compile(), "{dialect}");
    }
}

// ==================== Random / lock ====================

#[test]
fn test_random_order() {
    let cases = [
        (Dialect::MySql, "SELECT * FROM `t` ORDER BY `rank` DESC, RAND() LIMIT 1"),
        (Dialect::Postgres, r#"SELECT * FROM "t" ORDER BY "rank" DESC, RANDOM() LIMIT 1"#),
        (Dialect::Sqlite, r#"SELECT * FROM "t" ORDER BY "rank" DESC, RANDOM() LIMIT 1"#),
        (Dialect::SqlServer, "SELECT TOP 1 * FROM [t] ORDER BY [rank] DESC, NEWID()"),
    ];
    for (dialect, expected) in cases {
        let mut qb = qb(dialect);
        qb.random(Vec::<&str>::new())
            .unwrap()
            .from(["t"])
            .unwrap()
            .newest("rank")
            .unwrap();
        assert_eq!(qb.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_lock() {
    let cases = [
        (Dialect::MySql, "SELECT * FROM `jobs` FOR UPDATE"),
        (Dialect::Postgres, r#"SELECT * FROM "jobs" FOR UPDATE"#),
        (Dialect::Sqlite, r#"SELECT * FROM "jobs""#),
        (Dialect::SqlServer, "SELECT * FROM [jobs] WITH (UPDLOCK, ROWLOCK)"),
    ];
    for (dialect, expected) in cases {
        let mut qb = select_all(dialect, "jobs");
        qb.lock();
        assert_eq!(qb.render().unwrap(), expected, "{dialect}");
    }
}

// ==================== Writes ====================

#[test]
fn test_mysql_update_and_delete_accept_order_and_limit() {
    let mut update = qb(Dialect::MySql);
    update
        .update(["users"])
        .unwrap()
        .sets("a", 1)
        .unwrap()
        .where_("b", "=", 2)
        .unwrap()
        .oldest("id")
        .unwrap()
        .limit(5);
    assert_eq!(
        update.render().unwrap(),
        "UPDATE `users` SET `a` = 1 WHERE `b` = 2 ORDER BY `id` ASC LIMIT 5"
    );

    let mut delete = qb(Dialect::MySql);
    delete.delete().unwrap().from(["logs"]).unwrap().oldest("id").unwrap().limit(100);
    assert_eq!(
        delete.render().unwrap(),
        "DELETE FROM `logs` ORDER BY `id` ASC LIMIT 100"
    );

    delete.offset(10);
    assert!(delete.render().unwrap_err().is_compile());
}

#[test]
fn test_other_dialects_reject_limited_writes() {
    for dialect in [Dialect::Postgres, Dialect::Sqlite, Dialect::SqlServer] {
        let mut delete = qb(dialect);
        delete.delete().unwrap().from(["logs"]).unwrap().limit(100);
        assert!(delete.render().unwrap_err().is_compile(), "{dialect}");
    }
}

#[test]
fn test_insert_null_and_multi_row() {
    let mut qb = qb(Dialect::SqlServer);
    qb.insert(["id", "note"])
        .unwrap()
        .into("notes")
        .unwrap()
        .values((1, Value::Null))
        .unwrap()
        .values((2, param("note")))
        .unwrap();
    assert_eq!(
        qb.render().unwrap(),
        "INSERT INTO [notes] ([id], [note]) VALUES (1, NULL), (2, @note)"
    );
}

#[test]
fn test_writes_reject_joins() {
    let mut qb = qb(Dialect::MySql);
    qb.update(["a"]).unwrap().sets("x", 1).unwrap();
    qb.join("b", crate::operator::JoinType::Inner)
        .unwrap()
        .on("a.id", "=", "b.id")
        .unwrap();
    assert!(qb.render().unwrap_err().is_compile());
}

// ==================== Group concat ====================

#[test]
fn test_group_concat_per_dialect() {
    let cases = [
        (
            Dialect::MySql,
            "SELECT GROUP_CONCAT(`first`, `last` SEPARATOR '; ') AS `names` FROM `people` GROUP BY `team`",
        ),
        (
            Dialect::Postgres,
            r#"SELECT STRING_AGG(CONCAT("first", "last"), '; ') AS "names" FROM "people" GROUP BY "team""#,
        ),
        (
            Dialect::Sqlite,
            r#"SELECT GROUP_CONCAT("first" || "last", '; ') AS "names" FROM "people" GROUP BY "team""#,
        ),
        (
            Dialect::SqlServer,
            "SELECT STRING_AGG(CONCAT([first], [last]), '; ') AS [names] FROM [people] GROUP BY [team]",
        ),
    ];
    for (dialect, expected) in cases {
        let mut concat = BuilderConfig::new().dialect(dialect).group_concat();
        concat
            .columns(["first", "last"])
            .unwrap()
            .separator("; ")
            .alias("names")
            .unwrap();
        concat.from(["people"]).unwrap().group_by(["team"]).unwrap();
        assert_eq!(concat.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_group_concat_single_column_with_filter() {
    let mut concat = BuilderConfig::new().group_concat();
    concat.columns(["name"]).unwrap();
    concat
        .from(["users"])
        .unwrap()
        .where_("team_id", "=", param("team"))
        .unwrap();
    concat.bind_named("team", 3);
    assert_eq!(
        concat.render().unwrap(),
        r#"SELECT STRING_AGG("name", ',') AS "concat" FROM "users" WHERE "team_id" = $1"#
    );
}

#[test]
fn test_group_concat_needs_columns() {
    let mut concat = BuilderConfig::new().group_concat();
    concat.from(["users"]).unwrap();
    assert!(matches!(concat.render(), Err(OrmError::Compile(_))));
}

// ==================== Custom grammar ====================

struct Ansi;

impl Grammar for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn quote(&self) -> Quote {
        Quote::DOUBLE
    }

    fn random_order(&self) -> &'static str {
        "RANDOM()"
    }
}

#[test]
fn test_custom_grammar_uses_defaults() {
    let mut qb = BuilderConfig::new().grammar(Arc::new(Ansi)).query();
    qb.select(["id"])
        .unwrap()
        .from(["t"])
        .unwrap()
        .where_("a", "=", param("a"))
        .unwrap()
        .limit(3);
    assert_eq!(qb.grammar().name(), "ansi");
    assert_eq!(
        qb.render().unwrap(),
        r#"SELECT "id" FROM "t" WHERE "a" = :a LIMIT 3"#
    );
}

// ==================== UNION members ====================

#[test]
fn test_union_member_with_own_limit_is_parenthesized() {
    let cases = [
        (Dialect::MySql, "SELECT * FROM `a` UNION (SELECT * FROM `b` ORDER BY RAND() LIMIT 1)"),
        (Dialect::Postgres, r#"SELECT * FROM "a" UNION (SELECT * FROM "b" ORDER BY RANDOM() LIMIT 1)"#),
        (Dialect::SqlServer, "SELECT * FROM [a] UNION (SELECT TOP 1 * FROM [b] ORDER BY NEWID())"),
    ];
    for (dialect, expected) in cases {
        let mut member = qb(dialect);
        member.random(Vec::<&str>::new()).unwrap().from(["b"]).unwrap();
        let mut base = select_all(dialect, "a");
        base.union(member).unwrap();
        assert_eq!(base.render().unwrap(), expected, "{dialect}");
    }
}

#[test]
fn test_plain_union_member_is_bare() {
    let mut member = select_all(Dialect::Postgres, "b");
    member.where_("x", "=", 1).unwrap();
    let mut base = select_all(Dialect::Postgres, "a");
    base.union_all(member).unwrap().limit(5);
    assert_eq!(
        base.render().unwrap(),
        r#"SELECT * FROM "a" UNION ALL SELECT * FROM "b" WHERE "x" = 1 LIMIT 5"#
    );
}

#[test]
fn test_sqlite_rejects_scoped_union_member() {
    let mut member = select_all(Dialect::Sqlite, "b");
    member.newest("id").unwrap().limit(3);
    let mut base = select_all(Dialect::Sqlite, "a");
    base.union(member).unwrap();
    assert!(base.render().unwrap_err().is_compile());
}

#[test]
fn test_locked_union_member_is_rejected() {
    let mut member = select_all(Dialect::MySql, "b");
    member.lock();
    let mut base = select_all(Dialect::MySql, "a");
    base.union(member).unwrap();
    assert!(base.render().unwrap_err().is_compile());
}
