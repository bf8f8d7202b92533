//! Sample month data.
//!
//! Two consecutive months of a small site, in the shape a 6.9 install
//! writes them. Every section of the schema table appears in both, with
//! some rows shared between the months and some not.

use crate::fixtures::CacheFileBuilder;

/// Section names in the order a 6.9 install writes them.
pub const ALL_SECTIONS: [&str; 28] = [
    "general",
    "time",
    "visitor",
    "day",
    "domain",
    "login",
    "robot",
    "worms",
    "emailsender",
    "emailreceiver",
    "session",
    "sider",
    "filetypes",
    "os",
    "browser",
    "screensize",
    "unknownreferer",
    "unknownrefererbrowser",
    "origin",
    "sereferrals",
    "pagerefs",
    "searchwords",
    "keywords",
    "misc",
    "errors",
    "cluster",
    "sider_404",
    "plugin_geoip_city_maxmind",
];

/// November 2009.
pub fn november_2009() -> CacheFileBuilder {
    CacheFileBuilder::new()
        .section(
            "general",
            &[
                "LastLine 20091130235959 1046 17360 13842367221",
                "FirstTime 20091101000237",
                "LastTime 20091130235959",
                "LastUpdate 20091130235959 600000 0 600000 0 0",
                "TotalVisits 1475",
                "TotalUnique 876",
                "MonthHostsKnown 0",
                "MonthHostsUnknown 903",
            ],
        )
        .section(
            "time",
            &[
                "0 120 340 2100000 0 5 1200",
                "1 80 200 1400000 0 2 600",
                "13 300 900 6000000 1 9 3000",
            ],
        )
        .section(
            "visitor",
            &[
                "66.249.71.2 20 40 800000 20091130220000 20091130215000 /index.html",
                "10.0.0.1 3 9 12000",
                "192.168.1.5 7 15 90000 20091112080000",
            ],
        )
        .section(
            "day",
            &["20091101 50 130 1500000 40", "20091102 60 150 1700000 44"],
        )
        .section("domain", &["us 100 300 5000000", "de 40 90 1200000"])
        .section("login", &["admin 3 5 1000 20091120101010"])
        .section("robot", &["googlebot 500 4000000 20091130235000 12"])
        .section("worms", &["nimda 2 300 20091105101010"])
        .section("emailsender", &["a@example.com 1 100 20091101010101"])
        .section("emailreceiver", &["b@example.com 2 200 20091102020202"])
        .section("session", &["0s-30s 700", "30s-2mn 200"])
        .section(
            "sider",
            &["/index.html 400 2000000 300 250", "/about.html 30 90000 5 20"],
        )
        .section("filetypes", &["html 500 3000000 0 0", "png 800 9000000 0 0"])
        .section("os", &["linux 300", "winxp 500"])
        .section("browser", &["firefox 350", "msie8 200"])
        .section("screensize", &["1024x768 10"])
        .section("unknownreferer", &["UnknownAgent/1.0 20091110101010"])
        .section("unknownrefererbrowser", &["OddBrowser/2.1 20091111111111"])
        .section("origin", &["From0 400 1000", "From2 120 150"])
        .section("sereferrals", &["google 120 150"])
        .section("pagerefs", &["http://example.org/links.html 10 12"])
        .section("searchwords", &["rust+cache 4"])
        .section("keywords", &["rust 6", "cache 3"])
        .section("misc", &["AddToFavourites 0 12 0"])
        .section("errors", &["404 25 30000", "500 1 400"])
        .section("cluster", &["1 10 20 3000"])
        .section(
            "sider_404",
            &["/missing.html 3 http://example.org/old.html"],
        )
        .section(
            "plugin_geoip_city_maxmind",
            &["us_ca_san_francisco 5 10 20000 20091130101010"],
        )
}

/// December 2009.
pub fn december_2009() -> CacheFileBuilder {
    CacheFileBuilder::new()
        .section(
            "general",
            &[
                "LastLine 20091231235959 980 16100 22871231044",
                "FirstTime 20091201000109",
                "LastTime 20091231235959",
                "LastUpdate 20091231235959 662637 0 662637 0 0",
                "TotalVisits 1602",
                "TotalUnique 901",
                "MonthHostsKnown 0",
                "MonthHostsUnknown 930",
            ],
        )
        .section(
            "time",
            &[
                "0 100 310 1900000 0 3 800",
                "2 10 30 100000 0 0 0",
                "13 280 850 5800000 0 7 2500",
            ],
        )
        .section(
            "visitor",
            &[
                "66.249.71.2 25 60 900000 20091231220000 20091231215000 /news.html",
                "172.16.0.9 50 120 2000000 20091215101010",
            ],
        )
        .section(
            "day",
            &["20091201 55 140 1600000 41", "20091202 58 145 1650000 43"],
        )
        .section("domain", &["us 120 320 5200000", "fr 70 100 900000"])
        .section("login", &["admin 4 6 1300 20091222101010"])
        .section("robot", &["googlebot 450 3900000 20091231230000 10"])
        .section("worms", &["nimda 1 150 20091203101010"])
        .section("emailsender", &["a@example.com 2 300 20091201010101"])
        .section("emailreceiver", &["c@example.com 1 50 20091203030303"])
        .section("session", &["0s-30s 750", "2mn-5mn 40"])
        .section("sider", &["/index.html 420 2100000 310 260"])
        .section("filetypes", &["html 520 3100000 0 0", "css 200 400000 0 0"])
        .section("os", &["linux 320", "macosx 90"])
        .section("browser", &["firefox 380"])
        .section("screensize", &["1280x1024 4"])
        .section("unknownreferer", &["UnknownAgent/1.0 20091205101010"])
        .section("unknownrefererbrowser", &["OddBrowser/2.1 20091220111111"])
        .section("origin", &["From0 410 1020", "From1 2 2"])
        .section("sereferrals", &["google 130 160", "bing 5 6"])
        .section("pagerefs", &["http://example.org/links.html 8 9"])
        .section("searchwords", &["rust+cache 2", "awstats+merge 5"])
        .section("keywords", &["rust 4", "merge 5"])
        .section("misc", &["AddToFavourites 0 10 0"])
        .section("errors", &["404 20 25000", "403 2 800"])
        .section("cluster", &["1 12 22 3300"])
        .section(
            "sider_404",
            &[
                "/missing.html 2 http://example.org/older.html",
                "/gone.html 1 -",
            ],
        )
        .section(
            "plugin_geoip_city_maxmind",
            &["us_ca_san_francisco 6 12 24000 20091231101010"],
        )
}

/// A month with only the given sections from [`november_2009`].
pub fn november_2009_subset(sections: &[&str]) -> CacheFileBuilder {
    november_2009().retain_sections(sections)
}
