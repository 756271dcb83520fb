//! Keyword-driven intent classification

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::dictionary::EntityDictionary;
use crate::models::IntentKind;

/// Words that signal a ticket-price constraint
pub(crate) const PRICE_KEYWORDS: &[&str] =
    &["门票", "票价", "价格", "多少钱", "费用", "收费", "免费"];

/// Words that signal a rating constraint
pub(crate) const RATING_KEYWORDS: &[&str] = &["评分", "口碑", "评价", "分数"];

/// Qualifiers meaning "well rated" without a number
pub(crate) const FUZZY_RATING_QUALIFIERS: &[&str] =
    &["评分高", "高分", "最好", "最高", "好评", "口碑好"];

/// A number followed by a currency unit
pub(crate) static CURRENCY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s*(?:元|块)").expect("currency pattern is valid")
});

/// One entry of the ordered rule list: any keyword as a substring selects `intent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub intent: IntentKind,
    pub keywords: Vec<String>,
}

impl IntentRule {
    pub fn new(intent: IntentKind, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Built-in rule list, evaluated in order
#[must_use]
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule::new(IntentKind::Nearby, &["附近", "周边", "周围", "旁边", "边上"]),
        IntentRule::new(
            IntentKind::OpenTime,
            &["营业时间", "开放时间", "几点开门", "几点关门", "关门时间", "开门时间"],
        ),
        IntentRule::new(
            IntentKind::TicketPrice,
            &["门票", "票价", "多少钱", "价格", "费用", "收费"],
        ),
        IntentRule::new(
            IntentKind::CitySpots,
            &[
                "有哪些景点",
                "有什么景点",
                "景点推荐",
                "好玩的地方",
                "旅游景点",
                "推荐景点",
                "景点有哪些",
            ],
        ),
        IntentRule::new(IntentKind::Rating, &["评分", "评价", "多少分", "口碑", "分数"]),
        IntentRule::new(
            IntentKind::City,
            &["在哪个城市", "属于哪个城市", "位于哪个城市", "所在城市", "在哪个市"],
        ),
        IntentRule::new(
            IntentKind::Province,
            &["在哪个省份", "属于哪个省份", "位于哪个省份", "所在省份", "在哪个省"],
        ),
        IntentRule::new(
            IntentKind::Location,
            &["在哪里", "位置", "地址", "具体地点", "方位", "在哪儿", "在哪"],
        ),
        IntentRule::new(
            IntentKind::Contact,
            &["联系方式", "电话", "联系电话", "电话号码", "客服电话"],
        ),
        IntentRule::new(IntentKind::Introduction, &["介绍", "概况", "简介"]),
        IntentRule::new(IntentKind::Traffic, &["怎么去", "交通路线", "路线", "怎么走"]),
        IntentRule::new(
            IntentKind::SpotInfo,
            &["信息", "详情", "详细情况", "基本情况", "怎么样"],
        ),
    ]
}

/// Whether `text` carries any price or rating constraint
pub(crate) fn has_filter_signal(text: &str) -> bool {
    PRICE_KEYWORDS.iter().any(|k| text.contains(k))
        || RATING_KEYWORDS.iter().any(|k| text.contains(k))
        || FUZZY_RATING_QUALIFIERS.iter().any(|k| text.contains(k))
        || CURRENCY_AMOUNT.is_match(text)
}

/// Maps a question to an [`IntentKind`]
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl IntentClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom ordered rule list
    #[must_use]
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, question: &str, dictionary: &EntityDictionary) -> IntentKind {
        let text = question.trim().to_lowercase();
        if text.is_empty() {
            return IntentKind::Unknown;
        }

        if is_compound_filter(&text, dictionary) {
            debug!("Classified as compound filter");
            return IntentKind::CompoundFilter;
        }

        let intent = self
            .rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map_or(IntentKind::Unknown, |rule| rule.intent);
        debug!("Classified as {}", intent);
        intent
    }
}

/// A city, no attraction, and at least one filter signal
fn is_compound_filter(text: &str, dictionary: &EntityDictionary) -> bool {
    has_filter_signal(text)
        && dictionary.lookup_entity(text).is_none()
        && dictionary.lookup_city(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dictionary() -> EntityDictionary {
        EntityDictionary::from_names(
            ["故宫博物院", "天安门", "颐和园", "天坛公园"]
                .into_iter()
                .map(String::from),
            ["北京市", "上海市"].into_iter().map(String::from),
        )
    }

    #[rstest]
    #[case("天安门附近有什么好玩的", IntentKind::Nearby)]
    #[case("颐和园周边5公里的景点", IntentKind::Nearby)]
    #[case("故宫博物院的开放时间", IntentKind::OpenTime)]
    #[case("颐和园几点关门", IntentKind::OpenTime)]
    #[case("颐和园门票多少钱", IntentKind::TicketPrice)]
    #[case("北京有哪些景点", IntentKind::CitySpots)]
    #[case("颐和园的评分", IntentKind::Rating)]
    #[case("颐和园在哪个城市", IntentKind::City)]
    #[case("颐和园在哪个省份", IntentKind::Province)]
    #[case("天坛公园在哪里", IntentKind::Location)]
    #[case("故宫博物院的联系电话", IntentKind::Contact)]
    #[case("介绍一下天坛公园", IntentKind::Introduction)]
    #[case("去颐和园怎么走", IntentKind::Traffic)]
    #[case("颐和园怎么样", IntentKind::SpotInfo)]
    #[case("今天吃什么", IntentKind::Unknown)]
    #[case("   ", IntentKind::Unknown)]
    fn test_simple_rules(#[case] question: &str, #[case] expected: IntentKind) {
        assert_eq!(IntentClassifier::new().classify(question, &dictionary()), expected);
    }

    #[rstest]
    #[case("北京门票低于50元的景点")]
    #[case("北京评分高的景点")]
    #[case("上海免费的景点有哪些")]
    #[case("北京评分不低于4且门票100元以内的景点")]
    fn test_compound_filter(#[case] question: &str) {
        assert_eq!(
            IntentClassifier::new().classify(question, &dictionary()),
            IntentKind::CompoundFilter
        );
    }

    #[test]
    fn test_attraction_blocks_compound_filter() {
        // names an attraction, so this is a plain price question
        assert_eq!(
            IntentClassifier::new().classify("北京颐和园的门票价格", &dictionary()),
            IntentKind::TicketPrice
        );
    }

    #[test]
    fn test_city_rule_precedes_location() {
        let dict = dictionary();
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("天安门在哪个市", &dict), IntentKind::City);
        assert_eq!(classifier.classify("天安门在哪个省", &dict), IntentKind::Province);
        assert_eq!(classifier.classify("天安门在哪", &dict), IntentKind::Location);
        assert_eq!(classifier.classify("颐和园在哪个城市哪个省份", &dict), IntentKind::City);
    }

    #[test]
    fn test_custom_rules() {
        let classifier =
            IntentClassifier::with_rules(vec![IntentRule::new(IntentKind::Traffic, &["地铁"])]);
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(classifier.classify("颐和园坐地铁", &dictionary()), IntentKind::Traffic);
        assert_eq!(classifier.classify("颐和园门票", &dictionary()), IntentKind::Unknown);
    }

    #[test]
    fn test_latin_is_case_insensitive() {
        let classifier =
            IntentClassifier::with_rules(vec![IntentRule::new(IntentKind::TicketPrice, &["ticket"])]);
        assert_eq!(
            classifier.classify("Ticket price?", &EntityDictionary::default()),
            IntentKind::TicketPrice
        );
    }
}
