use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// 解析后的 XML 元素（只保留名称、属性、直接文本和子元素）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> Self {
        let attributes = start
            .attributes()
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                )
            })
            .collect();
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 路径匹配结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XmlMatch<'a> {
    Element(&'a XmlElement),
    Attribute(&'a str),
}

impl XmlMatch<'_> {
    pub fn text(&self) -> String {
        match self {
            XmlMatch::Element(element) => element.text.clone(),
            XmlMatch::Attribute(value) => value.to_string(),
        }
    }
}

/// 解析出唯一的根元素；任何语法错误、根外文本或多个根都返回 `None`
pub fn parse(input: &str) -> Option<XmlElement> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() {
                    return None;
                }
                stack.push(XmlElement::from_start(&start));
            }
            Ok(Event::Empty(start)) => {
                attach(&mut stack, &mut root, XmlElement::from_start(&start))?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop()?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().ok()?;
                stack.last_mut()?.text.push_str(&text);
            }
            Ok(Event::CData(data)) => {
                let data = data.into_inner();
                stack
                    .last_mut()?
                    .text
                    .push_str(&String::from_utf8_lossy(&data));
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return None;
    }
    root
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Option<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return None,
    }
    Some(())
}

#[derive(Debug)]
enum Segment<'p> {
    Element { name: &'p str, index: Option<usize> },
    Attribute(&'p str),
}

impl<'p> Segment<'p> {
    fn parse(raw: &'p str) -> Option<Self> {
        if let Some(attr) = raw.strip_prefix('@') {
            return Some(Segment::Attribute(attr));
        }
        match raw.split_once('[') {
            Some((name, rest)) => {
                let index = rest.strip_suffix(']')?.trim().parse::<usize>().ok()?;
                // XPath 下标从 1 开始
                if index == 0 {
                    return None;
                }
                Some(Segment::Element {
                    name,
                    index: Some(index),
                })
            }
            None => Some(Segment::Element {
                name: raw,
                index: None,
            }),
        }
    }

    fn matches(name: &str, element: &XmlElement) -> bool {
        name == "*" || name == element.name
    }
}

/// 元素路径查询
///
/// 支持 `root/child/leaf`、`/root/child`、`//leaf`（任意深度）、`*` 通配、
/// `name[n]` 下标以及末尾的 `@attr` 属性。
pub fn lookup<'a>(root: &'a XmlElement, path: &str) -> Option<XmlMatch<'a>> {
    let path = path.trim();
    let (descendant, rest) = match path.strip_prefix("//") {
        Some(rest) => (true, rest),
        None => (false, path.trim_start_matches('/')),
    };

    let segments = rest
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(Segment::parse)
        .collect::<Option<Vec<_>>>()?;

    if descendant {
        resolve_in(std::slice::from_ref(root), &segments)
            .or_else(|| find_descendant(root, &segments))
    } else {
        resolve_in(std::slice::from_ref(root), &segments)
    }
}

/// 在一组兄弟元素中匹配第一段，其余段在匹配元素下继续
fn resolve_in<'a>(siblings: &'a [XmlElement], segments: &[Segment]) -> Option<XmlMatch<'a>> {
    let (first, rest) = segments.split_first()?;
    let Segment::Element { name, index } = first else {
        return None;
    };

    let mut candidates = siblings.iter().filter(|c| Segment::matches(name, c));
    match index {
        Some(i) => candidates.nth(*i - 1).and_then(|c| resolve_below(c, rest)),
        None => candidates.find_map(|c| resolve_below(c, rest)),
    }
}

fn resolve_below<'a>(element: &'a XmlElement, rest: &[Segment]) -> Option<XmlMatch<'a>> {
    match rest {
        [] => Some(XmlMatch::Element(element)),
        [Segment::Attribute(name)] => element.attribute(name).map(XmlMatch::Attribute),
        [Segment::Attribute(_), ..] => None,
        _ => resolve_in(&element.children, rest),
    }
}

fn find_descendant<'a>(element: &'a XmlElement, segments: &[Segment]) -> Option<XmlMatch<'a>> {
    resolve_in(&element.children, segments)
        .or_else(|| element.children.iter().find_map(|c| find_descendant(c, segments)))
}
