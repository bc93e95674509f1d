// `{table}` 會在執行前替換成已加引號的資料表名稱

pub const GERMAN_GMAIL_USERS_PERCENTAGE_SQL: &str = "
    WITH german_gmail_users AS
    (
        SELECT
            COUNT(*) AS cnt
        FROM
            {table}
        WHERE
            LOWER(address_country) = 'germany' AND SUBSTR(LOWER(email_domain), 1, 6) = 'gmail.'
    )
    SELECT cnt * 100 / (SELECT COUNT(*) FROM {table}) AS german_gmail_users_percentage
    FROM german_gmail_users
";

pub const TOP_3_GMAIL_COUNTRIES_SQL: &str = "
    WITH gmail_users_count AS
    (
        SELECT
            LOWER(address_country) AS country,
            COUNT(*) AS cnt
        FROM
            {table}
        WHERE
            SUBSTR(LOWER(email_domain), 1, 6) = 'gmail.'
        GROUP BY 1
    ),
    ranked_countries AS
    (
        SELECT
            country, RANK() OVER (ORDER BY cnt DESC) AS country_rank
        FROM
            gmail_users_count
    )
    SELECT
        country, country_rank
    FROM
        ranked_countries
    WHERE
        country_rank <= 3
    ORDER BY country_rank, country
";

pub const TOP_3_GMAIL_COUNTRIES_SQL_2: &str = "
    SELECT
        LOWER(address_country) AS country,
        COUNT(*) AS gmail_users_count
    FROM
        {table}
    WHERE
        SUBSTR(LOWER(email_domain), 1, 6) = 'gmail.'
    GROUP BY 1
    ORDER BY 2 DESC, 1
    LIMIT 3
";

pub const PEOPLE_OVER_60_SQL: &str = "
    SELECT
        COUNT(*) AS count_people_over_60
    FROM
        {table}
    WHERE
        CAST(REPLACE(SUBSTR(age_range, 1, INSTR(age_range, '-') - 1), '[', '') AS INTEGER) > 60
";

pub const ROW_COUNT_SQL: &str = "SELECT COUNT(*) FROM {table}";
