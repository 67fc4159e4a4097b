use std::io::Cursor;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::Post;

/* Output
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>dev log</title>
  <link>https://blog.example.com</link>
  <description>Notes on Rust</description>
  <item>
    <title>Ownership</title>
    <link>https://blog.example.com/view/20230301_ownership/</link>
    <guid isPermaLink="false">9e2c7a44-1d3b-4f6e-8b21-6f0a9d3c5e77</guid>
    <description><![CDATA[Every value in Rust has a single owner.]]></description>
    <category>rust</category>
    <pubDate>Wed, 1 Mar 2023 20:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

pub struct FeedChannel<'a> {
    pub title: &'a str,
    pub site_url: &'a str,
    pub description: &'a str,
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

impl FeedChannel<'_> {
    /// Posts are written in the given order
    pub fn render(&self, posts: &[Arc<Post>]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.title)?;
        push_text(&mut writer, "link", self.site_url)?;
        push_text(&mut writer, "description", self.description)?;

        for post in posts {
            self.write_item(&mut writer, post)?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }

    fn write_item(&self, writer: &mut XmlWriter, post: &Post) -> quick_xml::Result<()> {
        writer.write_event(Event::Start(BytesStart::new("item")))?;

        push_text(writer, "title", post.title.as_str())?;
        push_text(writer, "link", &post_link(self.site_url, &post.slug))?;

        // Posts without a header have no id, the slug is stable enough
        let guid = if post.header.id.0.is_empty() { post.slug.as_str() } else { post.header.id.0.as_str() };
        let mut guid_elem = BytesStart::new("guid");
        guid_elem.push_attribute(("isPermaLink", "false"));
        writer.write_event(Event::Start(guid_elem))?;
        writer.write_event(Event::Text(BytesText::new(guid)))?;
        writer.write_event(Event::End(BytesEnd::new("guid")))?;

        push_cdata(writer, "description", post.summary())?;

        for tag in post.header.tags.iter() {
            push_text(writer, "category", tag)?;
        }

        let date = Utc.from_utc_datetime(&post.header.date);
        push_text(writer, "pubDate", &date.to_rfc2822())?;

        writer.write_event(Event::End(BytesEnd::new("item")))?;
        Ok(())
    }
}

fn post_link(site_url: &str, slug: &str) -> String {
    format!("{}/view/{}/", site_url.trim_end_matches('/'), slug)
}

fn push_text(writer: &mut XmlWriter, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut XmlWriter, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(new_text.as_str())))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::str;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::content::toc::TableOfContents;
    use crate::content::{PostHeader, PostId};

    use super::*;

    fn create_post(id: &str, description: Option<&str>) -> Arc<Post> {
        let dt = NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveTime::from_hms_opt(5, 6, 7).unwrap(),
        );
        Arc::new(Post {
            header: PostHeader {
                file_name: PathBuf::from(format!("post-{}.md", id)),
                id: PostId(id.to_string()),
                date: dt,
                author: "dayong".to_string(),
                tags: vec![format!("tag-{}", id)],
                series: None,
                description: description.map(str::to_string),
            },
            slug: format!("post-{}", id),
            title: format!("title-of-post-{}", id),
            rendered: format!("<p>body-of-post-{}</p>", id),
            excerpt: format!("excerpt-of-post-{}", id),
            toc: TableOfContents::default(),
            time_to_read: 1,
        })
    }

    #[test]
    fn render_xml() {
        let posts = vec![create_post("1", None), create_post("2", Some("a <b>]]> c"))];

        let channel = FeedChannel {
            title: "my feed",
            site_url: "https://blog.example.com/",
            description: "My blog feed",
        };
        let xml = channel.render(&posts).unwrap();
        assert_eq!(str::from_utf8(&xml).unwrap(), EXPECTED);
    }

    #[test]
    fn empty_id_uses_slug() {
        let mut post = Arc::try_unwrap(create_post("3", None)).ok().unwrap();
        post.header.id = PostId(String::new());

        let channel = FeedChannel {
            title: "t",
            site_url: "https://blog.example.com",
            description: "d",
        };
        let xml = channel.render(&[Arc::new(post)]).unwrap();
        assert!(str::from_utf8(&xml).unwrap().contains(r#"<guid isPermaLink="false">post-3</guid>"#));
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>my feed</title><link>https://blog.example.com/</link><description>My blog feed</description><item><title>title-of-post-1</title><link>https://blog.example.com/view/post-1/</link><guid isPermaLink="false">1</guid><description><![CDATA[excerpt-of-post-1]]></description><category>tag-1</category><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item><item><title>title-of-post-2</title><link>https://blog.example.com/view/post-2/</link><guid isPermaLink="false">2</guid><description><![CDATA[a <b>]] > c]]></description><category>tag-2</category><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item></channel></rss>"##;
}
