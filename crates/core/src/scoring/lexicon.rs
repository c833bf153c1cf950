// Korean stems matched by substring containment against the lowercased text.
// Order matters: keywords are reported in lexicon order.

pub const POSITIVE: &[&str] = &[
    "좋",
    "훌륭",
    "만족",
    "추천",
    "성공",
    "발전",
    "개선",
    "효과적",
    "우수",
];

pub const NEGATIVE: &[&str] = &[
    "나쁘",
    "실망",
    "문제",
    "불만",
    "실패",
    "악화",
    "부족",
    "비효율",
    "우려",
    "별로",
];
