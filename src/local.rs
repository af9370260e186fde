use std::net::Ipv4Addr;

use crate::dns_record::{DnsAnswer, DnsQuestion};

/// Answer every question with the same A record, without asking anyone.
pub fn create_response_answers(
    questions: &[DnsQuestion],
    ip: Ipv4Addr,
    ttl: u32,
) -> Vec<DnsAnswer> {
    questions
        .iter()
        .map(|question| DnsAnswer::new_a_record(question.name.clone(), ttl, ip))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_answer_per_question_in_order() {
        let questions = vec![
            DnsQuestion::address("abc.example.com"),
            DnsQuestion {
                name: "def.example.com".to_string(),
                record_type: 28,
                record_class: 1,
            },
        ];

        let answers = create_response_answers(&questions, Ipv4Addr::new(8, 8, 8, 8), 60);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].name, "abc.example.com");
        assert_eq!(answers[1].name, "def.example.com");
        for answer in &answers {
            assert_eq!(answer.record_type, 1);
            assert_eq!(answer.ttl, 60);
            assert_eq!(answer.rdata, vec![8, 8, 8, 8]);
        }
    }
}
