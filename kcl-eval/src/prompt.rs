//! Prompt template for answering a question from retrieved context.

/// System instruction: a careful Korean legal assistant that only uses the given context.
pub const SYSTEM_PROMPT: &str = "너는 신중한 한국어 법률 도우미야. 아래 '검색 문맥'에 있는 정보만 근거로 사용해. \
먼저 정답을 도출하는 추론 과정(Reasoning)을 작성하고, \
마지막 줄에 '정답: X' (X는 A, B, C, D 중 하나) 형식으로 답을 출력해.";

/// Rules the model must follow.
pub const RULES: &str = "규칙:
1) 반드시 '검색 문맥'의 사실만을 근거로 사용한다.
2) '검색 문맥'의 사실을 바탕으로 하여 분석 및 추론할 수 있다.
3) 단, '검색 문맥'의 정답(정답 라벨)은 현재 문제의 정답(정답 라벨)과 별개이다.
4) 가장 타당한 보기를 1개 고른다.
5) 단계별로 추론(Chain of Thought)을 서술한다.
6) 추론이 끝난 후 마지막 줄에 반드시 '정답: [A/B/C/D]' 형식으로만 결론을 낸다.
";

/// One worked example showing the expected output shape.
///
/// The options are shuffled relative to the context so the model learns to
/// map by content, not by letter.
pub const FEW_SHOT_EXAMPLE: &str = "Example (Few-Shot):
[Search Context]
질문: 살인죄에 대한 설명으로 옳은 것은?
선택지:
A) 과실치사는 살인죄에 포함된다.
B) 미필적 고의에 의한 살인은 인정되지 않는다.
C) 사람을 살해하면 5년 이상의 징역에 처할 수 있다.
D) 살인의 고의는 반드시 확정적이어야 한다.
정답: C

[Question]
살인죄에 대한 설명으로 옳은 것은?
A) 살인의 고의는 반드시 확정적이어야 한다.
B) 사람을 살해하면 5년 이상의 징역에 처할 수 있다.
C) 미필적 고의에 의한 살인은 인정되지 않는다.
D) 과실치사는 살인죄에 포함된다.

Output:
'검색 문맥'에서, 본 문제와 유사한 사례를 찾아, 본 문제 정답의 근거로 삼습니다.
문맥에 따르면, 정답 C(\"사람을 살해하면 5년 이상의 징역\")가 올바른 정답으로 제시되었습니다.
문맥의 정답 C는 본 문제의 선택지 B와 유사합니다.
또한, 문맥의 틀린 선택지(A, B, D)를 고려하면, 본 문제의 A, C, D는 틀린 선택지입니다.
따라서 문맥에 부합하는 가장 적절한 답은 B입니다.
정답: B
";

/// Build the user prompt for one question.
pub fn user_prompt(context: &str, question_block: &str) -> String {
    format!(
        "{RULES}\n\n{FEW_SHOT_EXAMPLE}\n\n[Search Context]\n{context}\n\n\
         [Question]\n{question_block}\n\nOutput:\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_appear_in_order() {
        let prompt = user_prompt("문맥 본문", "질문 본문\nA) 가");
        let rules = prompt.find("규칙:").unwrap();
        let example = prompt.find("Example (Few-Shot):").unwrap();
        let context = prompt.find("[Search Context]\n문맥 본문").unwrap();
        let question = prompt.find("[Question]\n질문 본문\nA) 가").unwrap();
        assert!(rules < example && example < context && context < question);
        assert!(prompt.ends_with("Output:\n"));
    }

    #[test]
    fn system_prompt_demands_final_line() {
        assert!(SYSTEM_PROMPT.contains("정답: X"));
    }
}
