// Benchmark helpers are shared between bench targets, each of which only
// uses some of them
#[allow(dead_code)]
pub fn generate_talk_page(sections: usize, replies: usize) -> String {
    let mut page = String::from("{{Talk header}}\n");

    for section in 0..sections {
        page.push_str(&format!("== Discussion {section} ==\n"));
        for reply in 0..replies {
            let indent = ":".repeat(reply.min(5));
            let minute = (section + reply) % 60;
            let day = section % 28 + 1;
            page.push_str(&format!(
                "{indent}Point {reply} about {{{{tl|cite web}}}} and [[Some page|a link]]. \
                 [[User:Editor {reply}|Editor {reply}]] ([[User talk:Editor {reply}|talk]]) \
                 12:{minute:02}, {day} March 2024 (UTC)\n"
            ));
        }
        if section % 3 == 0 {
            page.push_str("{{unsigned|Drive-by|13:00, 1 April 2024}}\n");
        }
        page.push('\n');
    }

    page
}

#[allow(dead_code)]
pub fn last_section_target(sections: usize) -> wikitalk_engine::SectionTarget {
    let last = sections - 1;
    wikitalk_engine::SectionTarget {
        headline: format!("Discussion {last}"),
        ordinal_index: Some(last),
        ancestor_headlines: Vec::new(),
        oldest_comment: Some(wikitalk_engine::CommentFingerprint {
            author: "Editor 0".to_string(),
            timestamp: Some(format!("12:{:02}, {} March 2024 (UTC)", last % 60, last % 28 + 1)),
            text_sample: "Point 0 about and a link.".to_string(),
        }),
    }
}
