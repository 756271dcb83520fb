//! Answer templates
//!
//! Rendering is pure: the same question and rows always give the same text.
//! Missing attribute values fall back to placeholders, and an empty result
//! always gives [`FALLBACK_ANSWER`].

use chrono::NaiveTime;

use crate::models::{Attraction, IntentKind, OpeningHours, ParsedQuestion, QueryResult, ResultRow};

/// Answer for anything that cannot be answered
pub const FALLBACK_ANSWER: &str = "抱歉，暂时无法回答这个问题。";

const NO_RATING: &str = "暂无评分";
const NO_PRICE: &str = "暂无票价信息";
const FREE: &str = "免费";
const UNKNOWN_VALUE: &str = "未知";
const DEFAULT_KIND: &str = "景点";

const SECONDS_PER_DAY: u32 = 86_400;

#[must_use]
pub fn render(parsed: &ParsedQuestion, result: &QueryResult) -> String {
    if result.is_empty() {
        return FALLBACK_ANSWER.to_string();
    }

    match parsed.intent {
        IntentKind::Nearby => render_nearby(parsed, &result.rows),
        IntentKind::CitySpots => render_city_spots(parsed, &result.rows),
        IntentKind::CompoundFilter => render_compound(parsed, &result.rows),
        intent => match result.first() {
            Some(row) => render_single(intent, &row.attraction),
            None => FALLBACK_ANSWER.to_string(),
        },
    }
}

fn render_single(intent: IntentKind, a: &Attraction) -> String {
    match intent {
        IntentKind::OpenTime => opening_hours(&a.name, &a.opening_hours),
        IntentKind::TicketPrice => format!("{}的门票价格：{}", a.name, price_label(a.cost)),
        IntentKind::Rating => match a.rating {
            Some(r) => format!("{}的评分为：{:.1}分", a.name, r),
            None => format!("{}{}", a.name, NO_RATING),
        },
        IntentKind::Location => location(a),
        IntentKind::Contact => format!("{}的联系电话是：{}", a.name, phone_label(a.tel.as_deref())),
        IntentKind::City => format!("{}位于{}。", a.name, a.city.as_deref().unwrap_or(UNKNOWN_VALUE)),
        IntentKind::Province => {
            format!("{}位于{}。", a.name, a.province.as_deref().unwrap_or(UNKNOWN_VALUE))
        }
        IntentKind::Introduction => introduction(a),
        IntentKind::Traffic => traffic(a),
        _ => spot_info(a),
    }
}

fn render_nearby(parsed: &ParsedQuestion, rows: &[ResultRow]) -> String {
    let reference = parsed.entity_name.as_deref().unwrap_or(UNKNOWN_VALUE);
    let radius = parsed.radius_km.unwrap_or_default();
    let lines = rows.iter().enumerate().map(|(i, row)| {
        let a = &row.attraction;
        format!(
            "{}. {}（{}，距离{}，评分{}）",
            i + 1,
            a.name,
            kind_label(a),
            row.distance_km.map_or_else(|| UNKNOWN_VALUE.to_string(), distance_label),
            rating_label(a.rating)
        )
    });
    numbered(format!("{reference}附近{radius}公里内的景点有："), lines)
}

fn render_city_spots(parsed: &ParsedQuestion, rows: &[ResultRow]) -> String {
    let city = parsed.city_name.as_deref().unwrap_or(UNKNOWN_VALUE);
    let lines = rows.iter().enumerate().map(|(i, row)| {
        let a = &row.attraction;
        format!("{}. {}（{}，评分{}）", i + 1, a.name, kind_label(a), rating_label(a.rating))
    });
    numbered(format!("{city}的推荐景点有："), lines)
}

fn render_compound(parsed: &ParsedQuestion, rows: &[ResultRow]) -> String {
    let city = parsed.city_name.as_deref().unwrap_or(UNKNOWN_VALUE);
    let lines = rows.iter().enumerate().map(|(i, row)| {
        let a = &row.attraction;
        format!(
            "{}. {}（{}，评分{}，门票{}）",
            i + 1,
            a.name,
            kind_label(a),
            rating_label(a.rating),
            price_label(a.cost)
        )
    });
    numbered(format!("{city}符合条件的景点有："), lines)
}

fn numbered(header: String, lines: impl Iterator<Item = String>) -> String {
    std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n")
}

fn kind_label(a: &Attraction) -> &str {
    a.kind.as_deref().unwrap_or(DEFAULT_KIND)
}

fn rating_label(rating: Option<f64>) -> String {
    rating.map_or_else(|| NO_RATING.to_string(), |r| format!("{r:.1}"))
}

/// "免费", "{cost}元" or the missing-price placeholder
#[must_use]
pub fn price_label(cost: Option<f64>) -> String {
    match cost {
        None => NO_PRICE.to_string(),
        Some(c) if c <= 0.0 => FREE.to_string(),
        Some(c) => format!("{c}元"),
    }
}

/// Whole metres below one kilometre, otherwise kilometres with one decimal.
/// The cut-off applies after rounding to metres.
#[must_use]
pub fn distance_label(distance_km: f64) -> String {
    let metres = (distance_km * 1000.0).round();
    if metres < 1000.0 {
        format!("{metres}米")
    } else {
        format!("{distance_km:.1}公里")
    }
}

/// Seconds since midnight as `HH:MM`; a full day renders as "24:00"
#[must_use]
pub fn clock_label(seconds: u32) -> String {
    if seconds >= SECONDS_PER_DAY {
        return "24:00".to_string();
    }
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .map_or_else(|| "24:00".to_string(), |t| t.format("%H:%M").to_string())
}

fn opening_hours(name: &str, hours: &OpeningHours) -> String {
    if hours.is_empty() {
        return FALLBACK_ANSWER.to_string();
    }
    if let Some(today) = hours.today_text() {
        return format!("{name}今日营业时间：{today}");
    }
    if let Some(weekly) = hours.weekly_text() {
        return format!("{name}的营业时间：{weekly}");
    }
    match (hours.start_secs, hours.end_secs) {
        (Some(start), Some(end)) => format!(
            "{name}的营业时间为每天{}-{}。",
            clock_label(start),
            clock_label(end)
        ),
        _ => FALLBACK_ANSWER.to_string(),
    }
}

/// Several numbers joined with "；", a lone digit string of seven or more
/// digits grouped as `XXX-XXXX` or `XXX-XXXX-REST`, anything else verbatim
#[must_use]
pub fn phone_label(tel: Option<&str>) -> String {
    let Some(tel) = tel.map(str::trim).filter(|t| !t.is_empty()) else {
        return UNKNOWN_VALUE.to_string();
    };

    let numbers: Vec<&str> = tel
        .split(|c: char| c.is_whitespace() || matches!(c, ';' | '；' | ',' | '，'))
        .filter(|n| !n.is_empty())
        .collect();

    match numbers.as_slice() {
        [single] if single.len() == 7 && single.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}-{}", &single[..3], &single[3..])
        }
        [single] if single.len() > 7 && single.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}-{}-{}", &single[..3], &single[3..7], &single[7..])
        }
        [single] => (*single).to_string(),
        [] => UNKNOWN_VALUE.to_string(),
        many => many.join("；"),
    }
}

fn place(a: &Attraction) -> String {
    match (a.province.as_deref(), a.city.as_deref()) {
        (Some(p), Some(c)) if c.starts_with(p) => c.to_string(),
        (Some(p), Some(c)) => format!("{p}{c}"),
        (Some(p), None) => p.to_string(),
        (None, Some(c)) => c.to_string(),
        (None, None) => String::new(),
    }
}

fn location(a: &Attraction) -> String {
    let place = place(a);
    match (place.is_empty(), a.address.as_deref()) {
        (false, Some(address)) => format!("{}位于{}，详细地址：{}。", a.name, place, address),
        (true, Some(address)) => format!("{}的地址：{}。", a.name, address),
        (false, None) => format!("{}位于{}。", a.name, place),
        (true, None) => format!("{}的位置：{}", a.name, UNKNOWN_VALUE),
    }
}

fn introduction(a: &Attraction) -> String {
    let place = place(a);
    let place = if place.is_empty() { UNKNOWN_VALUE } else { place.as_str() };
    format!(
        "{}是位于{}的{}，评分{}，门票{}。",
        a.name,
        place,
        kind_label(a),
        rating_label(a.rating),
        price_label(a.cost)
    )
}

fn traffic(a: &Attraction) -> String {
    let address = a.address.as_deref().unwrap_or(UNKNOWN_VALUE);
    match a.coordinates {
        Some(c) => format!("{}的地址：{}，坐标：{}。", a.name, address, c.format_coordinates()),
        None => format!("{}的地址：{}。", a.name, address),
    }
}

fn spot_info(a: &Attraction) -> String {
    let place = place(a);
    let hours = &a.opening_hours;
    let hours = hours
        .today_text()
        .or_else(|| hours.weekly_text())
        .map(str::to_string)
        .or_else(|| {
            Some(format!("{}-{}", clock_label(hours.start_secs?), clock_label(hours.end_secs?)))
        })
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string());

    [
        format!("{}的基本信息：", a.name),
        format!("类型：{}", kind_label(a)),
        format!("所在地：{}", if place.is_empty() { UNKNOWN_VALUE } else { place.as_str() }),
        format!("地址：{}", a.address.as_deref().unwrap_or(UNKNOWN_VALUE)),
        format!("评分：{}", rating_label(a.rating)),
        format!("门票：{}", price_label(a.cost)),
        format!("营业时间：{hours}"),
        format!("电话：{}", phone_label(a.tel.as_deref())),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn summer_palace() -> Attraction {
        Attraction::new("颐和园")
            .with_kind("风景名胜")
            .with_address("海淀区新建宫门路19号")
            .in_city("北京市", "北京")
            .at(39.9999, 116.2755)
            .with_rating(4.8)
            .with_cost(30.0)
            .with_tel("01062881144")
    }

    fn single(intent: IntentKind, a: Attraction) -> String {
        let parsed = ParsedQuestion::new(intent, "").with_entity(a.name.clone());
        render(&parsed, &QueryResult::from(Some(a)))
    }

    #[rstest]
    #[case(IntentKind::Nearby)]
    #[case(IntentKind::TicketPrice)]
    #[case(IntentKind::CitySpots)]
    #[case(IntentKind::Unknown)]
    fn test_empty_result_is_fallback(#[case] intent: IntentKind) {
        let parsed = ParsedQuestion::new(intent, "?");
        assert_eq!(render(&parsed, &QueryResult::empty()), FALLBACK_ANSWER);
    }

    #[rstest]
    #[case(None, "暂无票价信息")]
    #[case(Some(0.0), "免费")]
    #[case(Some(30.0), "30元")]
    #[case(Some(12.5), "12.5元")]
    fn test_price_label(#[case] cost: Option<f64>, #[case] expected: &str) {
        assert_eq!(price_label(cost), expected);
    }

    #[test]
    fn test_free_ticket_answer() {
        let answer = single(IntentKind::TicketPrice, Attraction::new("天安门").with_cost(0.0));
        assert_eq!(answer, "天安门的门票价格：免费");
    }

    #[rstest]
    #[case(0.85, "850米")]
    #[case(0.0004, "0米")]
    #[case(0.9994, "999米")]
    #[case(0.9996, "1.0公里")]
    #[case(1.0, "1.0公里")]
    #[case(3.04, "3.0公里")]
    fn test_distance_label(#[case] km: f64, #[case] expected: &str) {
        assert_eq!(distance_label(km), expected);
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(8 * 3600 + 30 * 60, "08:30")]
    #[case(86_400, "24:00")]
    #[case(90_000, "24:00")]
    fn test_clock_label(#[case] seconds: u32, #[case] expected: &str) {
        assert_eq!(clock_label(seconds), expected);
    }

    #[rstest]
    #[case(None, "未知")]
    #[case(Some("01062881144"), "010-6288-1144")]
    #[case(Some("010-62881144"), "010-62881144")]
    #[case(Some("12345"), "12345")]
    #[case(Some("1234567"), "123-4567")]
    #[case(Some("010-1234;010-5678"), "010-1234；010-5678")]
    #[case(Some("01012345678 01087654321"), "01012345678；01087654321")]
    fn test_phone_label(#[case] tel: Option<&str>, #[case] expected: &str) {
        assert_eq!(phone_label(tel), expected);
    }

    #[test]
    fn test_opening_hours_priority() {
        let mut hours = OpeningHours::daily(8 * 3600, 17 * 3600);
        let a = Attraction::new("颐和园");
        assert_eq!(
            single(IntentKind::OpenTime, a.clone().with_opening_hours(hours.clone())),
            "颐和园的营业时间为每天08:00-17:00。"
        );

        hours.weekly = Some("周一至周日 06:30-18:00".to_string());
        assert_eq!(
            single(IntentKind::OpenTime, a.clone().with_opening_hours(hours.clone())),
            "颐和园的营业时间：周一至周日 06:30-18:00"
        );

        hours.today = Some("06:30-18:00".to_string());
        assert_eq!(
            single(IntentKind::OpenTime, a.clone().with_opening_hours(hours)),
            "颐和园今日营业时间：06:30-18:00"
        );

        assert_eq!(single(IntentKind::OpenTime, a), FALLBACK_ANSWER);
    }

    #[test]
    fn test_single_attribute_templates() {
        assert_eq!(single(IntentKind::Rating, summer_palace()), "颐和园的评分为：4.8分");
        assert_eq!(single(IntentKind::Rating, Attraction::new("某地")), "某地暂无评分");
        assert_eq!(single(IntentKind::City, summer_palace()), "颐和园位于北京市。");
        assert_eq!(single(IntentKind::Province, summer_palace()), "颐和园位于北京。");
        assert_eq!(
            single(IntentKind::Contact, summer_palace()),
            "颐和园的联系电话是：010-6288-1144"
        );
        assert_eq!(
            single(IntentKind::Location, summer_palace()),
            "颐和园位于北京市，详细地址：海淀区新建宫门路19号。"
        );
        assert!(single(IntentKind::Traffic, summer_palace()).contains("39.9999, 116.2755"));
        assert!(single(IntentKind::Introduction, summer_palace()).contains("风景名胜"));
    }

    #[test]
    fn test_spot_info_lists_everything() {
        let answer = single(IntentKind::Unknown, summer_palace());
        for expected in ["风景名胜", "海淀区新建宫门路19号", "4.8", "30元", "010-6288-1144"] {
            assert!(answer.contains(expected), "missing {expected} in {answer}");
        }
        assert!(answer.contains("营业时间：未知"));
    }

    #[test]
    fn test_blank_hours_text_is_skipped() {
        let hours = OpeningHours {
            today: Some(String::new()),
            weekly: Some("周一至周日".to_string()),
            ..OpeningHours::default()
        };
        let a = summer_palace().with_opening_hours(hours);
        assert!(single(IntentKind::SpotInfo, a.clone()).contains("营业时间：周一至周日"));
        assert_eq!(single(IntentKind::OpenTime, a), "颐和园的营业时间：周一至周日");

        let blank = OpeningHours {
            today: Some(" ".to_string()),
            ..OpeningHours::default()
        };
        let a = summer_palace().with_opening_hours(blank);
        assert!(single(IntentKind::SpotInfo, a.clone()).contains("营业时间：未知"));
        assert_eq!(single(IntentKind::OpenTime, a), FALLBACK_ANSWER);
    }

    #[test]
    fn test_nearby_list() {
        let mut parsed = ParsedQuestion::new(IntentKind::Nearby, "").with_entity("天安门");
        parsed.radius_km = Some(5.0);
        let result = QueryResult::from(vec![
            ResultRow::with_distance(Attraction::new("故宫博物院").with_rating(4.9), 0.85),
            ResultRow::with_distance(Attraction::new("天坛公园").with_kind("公园"), 3.04),
        ]);

        assert_eq!(
            render(&parsed, &result),
            "天安门附近5公里内的景点有：\n\
             1. 故宫博物院（景点，距离850米，评分4.9）\n\
             2. 天坛公园（公园，距离3.0公里，评分暂无评分）"
        );
    }

    #[test]
    fn test_compound_list_shows_price() {
        let parsed = ParsedQuestion::new(IntentKind::CompoundFilter, "").with_city("北京市");
        let result = QueryResult::from(Some(Attraction::new("天安门").with_rating(4.7).with_cost(0.0)));
        assert_eq!(
            render(&parsed, &result),
            "北京市符合条件的景点有：\n1. 天安门（景点，评分4.7，门票免费）"
        );
    }
}
