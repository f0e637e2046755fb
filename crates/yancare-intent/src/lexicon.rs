use yancare_core::config::Language;
use yancare_core::Intent;

/// How a keyword is looked for in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
	/// Keyword occurs anywhere in the lowercased text. Suits Chinese, which
	/// has no word boundaries.
	Substring,
	/// Keyword words occur as a contiguous run of message words, so "hi"
	/// does not match inside "this".
	Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsultRule {
	pub intent: Intent,
	pub category: String,
	pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentLexicon {
	pub mode: MatchMode,
	pub greeting: Vec<String>,
	pub thanks: Vec<String>,
	pub goodbye: Vec<String>,
	pub complaint: Vec<String>,
	/// Consult rules in tie-break order.
	pub consult: Vec<ConsultRule>,
}

fn words(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

fn rule(intent: Intent, category: &str, keywords: &[&str]) -> ConsultRule {
	ConsultRule { intent, category: category.to_string(), keywords: words(keywords) }
}

impl IntentLexicon {
	pub fn for_language(language: Language) -> Self {
		match language {
			Language::Zh => Self::chinese(),
			Language::En => Self::english(),
		}
	}

	/// Production table for the Chinese-language assistant.
	pub fn chinese() -> Self {
		Self {
			mode: MatchMode::Substring,
			greeting: words(&["你好", "您好", "hi", "hello", "嗨", "哈喽", "在吗", "在不在", "早上好", "下午好", "晚上好"]),
			thanks: words(&["谢谢", "谢了", "多谢", "感谢", "太好了", "辛苦", "麻烦", "thanks", "thx"]),
			goodbye: words(&["再见", "拜拜", "byebye", "bye", "88", "先走了", "走了", "下次聊"]),
			complaint: words(&["投诉", "不满意", "差", "烂", "坑", "骗", "退款", "不好", "反馈", "建议"]),
			consult: vec![
				rule(Intent::ConsultCard, "卡种", &[
					"卡", "办卡", "会员卡", "充值", "储值",
					"价格", "多少钱", "费用", "收费", "优惠",
					"套餐", "划算", "哪种卡", "什么卡",
				]),
				rule(Intent::ConsultService, "服务", &[
					"服务", "项目", "洗头", "泡头", "养发",
					"做什么", "有什么", "怎么做", "流程",
					"效果", "功效", "作用", "好处",
				]),
				rule(Intent::ConsultBooking, "预约", &[
					"预约", "约", "订", "安排", "时间",
					"怎么约", "如何约", "取消", "改约",
					"爽约", "迟到", "提前", "当天",
				]),
				rule(Intent::ConsultStore, "门店", &[
					"门店", "店", "地址", "在哪", "位置",
					"电话", "联系", "营业时间", "几点", "开门",
					"水岸", "阳光", "怎么去", "路线", "交通",
				]),
				rule(Intent::ConsultKnowledge, "养发知识", &[
					"脱发", "掉发", "掉头发", "掉发多", "掉得多",
					"头发掉", "头发少", "头发稀", "发量少",
					"头发", "头皮", "油", "油腻", "出油",
					"干", "干燥", "痒", "屑", "头屑",
					"白发", "少年白", "白头发",
					"生发", "防脱", "养护", "保养", "护理",
					"为什么", "原因", "怎么办", "如何", "多久",
					"经常掉", "大量掉", "严重",
				]),
			],
		}
	}

	pub fn english() -> Self {
		Self {
			mode: MatchMode::Token,
			greeting: words(&["hi", "hello", "hey", "good morning", "good afternoon", "good evening", "anyone there"]),
			thanks: words(&["thanks", "thank you", "thx", "appreciate it", "great help"]),
			goodbye: words(&["bye", "goodbye", "see you", "see you later", "talk later", "gotta go"]),
			complaint: words(&["complain", "complaint", "unhappy", "terrible", "awful", "refund", "rip off", "scam", "not satisfied", "feedback", "suggestion"]),
			consult: vec![
				rule(Intent::ConsultCard, "card", &[
					"card", "cards", "membership", "top up", "recharge", "prepaid", "price",
					"how much", "cost", "fee", "discount", "package", "deal", "which card",
				]),
				rule(Intent::ConsultService, "service", &[
					"service", "services", "treatment", "scalp massage", "hair wash", "head spa", "care",
					"what do you offer", "procedure", "process", "effect", "benefit", "results",
				]),
				rule(Intent::ConsultBooking, "booking", &[
					"book", "booking", "appointment", "reserve", "reservation", "schedule", "slot",
					"cancel", "reschedule", "late", "no show", "in advance", "same day",
				]),
				rule(Intent::ConsultStore, "store", &[
					"store", "shop", "address", "where", "location", "phone", "contact",
					"opening hours", "open", "close", "directions", "parking", "how to get",
				]),
				rule(Intent::ConsultKnowledge, "knowledge", &[
					"hair loss", "hair fall", "losing hair", "thinning", "bald", "scalp", "oily",
					"greasy", "dry", "itchy", "dandruff", "gray hair", "grey hair", "regrowth",
					"prevent", "care routine", "why", "cause", "how often", "how long", "serious",
				]),
			],
		}
	}

	/// Relabel the category of the consult rule for `intent`.
	pub fn set_category(&mut self, intent: Intent, category: impl Into<String>) -> bool {
		match self.consult.iter_mut().find(|r| r.intent == intent) {
			Some(r) => { r.category = category.into(); true }
			None => false,
		}
	}

	pub fn category_for(&self, intent: Intent) -> Option<&str> {
		self.consult.iter().find(|r| r.intent == intent).map(|r| r.category.as_str())
	}
}
