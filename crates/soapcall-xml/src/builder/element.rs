use std::borrow::Cow;

use crate::builder::{AliasMap, Attribute, Namespace, NamespaceWrite, XmlBuilderError};

#[derive(Debug, Clone)]
pub enum Content<'a> {
    /// Text content, escaped when written.
    Text(Cow<'a, str>),
    /// Child elements.
    Elements(Vec<Element<'a>>),
    /// A pre-formed XML fragment written verbatim. The element is always
    /// written with an explicit end tag, even when the fragment is empty.
    Raw(Cow<'a, str>),

    None,
}

/// Represents an XML element.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    /// The local name of the element.
    name: Cow<'a, str>,
    /// The namespace the element belongs to, resolved to an alias on write.
    namespace: Option<Namespace<'a>>,
    /// `xmlns` declarations carried by this element, in declaration order.
    namespace_declarations: Vec<(Namespace<'a>, Option<&'a str>)>,
    attributes: Vec<Attribute<'a>>,
    content: Content<'a>,
}

impl<'a> Element<'a> {
    /// Creates a new instance of `Element` with the given name.
    ///
    /// # Example
    ///
    /// ```
    /// use soapcall_xml::builder::Element;
    /// let element = Element::new("root");
    /// ```
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            namespace_declarations: Vec::new(),
            attributes: Vec::new(),
            content: Content::None,
        }
    }

    /// Places the element in `namespace`. Some declaration in scope must bind
    /// the namespace when the element is written.
    pub fn set_namespace(mut self, namespace: impl Into<Namespace<'a>>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Declares `url` on this element, under `alias` or as the default
    /// namespace when `alias` is `None`.
    pub fn add_namespace_declaration(mut self, url: &'a str, alias: Option<&'a str>) -> Self {
        self.namespace_declarations.push((Namespace::new(url), alias));
        self
    }

    pub fn add_attribute(mut self, attribute: Attribute<'a>) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds a child element. Any text or raw content is replaced.
    pub fn add_child(mut self, child: Self) -> Self {
        match self.content {
            Content::Elements(ref mut children) => children.push(child),
            _ => self.content = Content::Elements(vec![child]),
        }
        self
    }

    pub fn add_children(mut self, children: Vec<Self>) -> Self {
        for child in children {
            self = self.add_child(child);
        }
        self
    }

    /// Sets the text content of the element, replacing any children.
    pub fn set_text(mut self, text: impl Into<Cow<'a, str>>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    /// Sets a pre-formed XML fragment as the content of the element.
    pub fn set_raw(mut self, fragment: impl Into<Cow<'a, str>>) -> Self {
        self.content = Content::Raw(fragment.into());
        self
    }

    fn scoped_aliases(&self, inherited: Option<&AliasMap<'a>>) -> AliasMap<'a> {
        let mut map = inherited.cloned().unwrap_or_default();
        let mut declared_here = Vec::with_capacity(self.namespace_declarations.len());
        for (namespace, alias) in &self.namespace_declarations {
            // The first declaration of a URI on this element decides its alias.
            if declared_here.contains(namespace) {
                continue;
            }
            declared_here.push(*namespace);
            map.insert(*namespace, *alias);
        }
        map
    }

    fn qualified_name(&self, aliases: &AliasMap<'a>) -> Result<Cow<'_, str>, XmlBuilderError> {
        let Some(namespace) = &self.namespace else {
            return Ok(Cow::Borrowed(self.name.as_ref()));
        };

        match aliases.get(namespace) {
            Some(Some(alias)) => Ok(Cow::Owned(format!("{alias}:{}", self.name))),
            Some(None) => Ok(Cow::Borrowed(self.name.as_ref())),
            None => Err(XmlBuilderError::NamespaceNotDeclared {
                tag: self.name.to_string(),
                ns: namespace.url.to_string(),
            }),
        }
    }
}

impl<'a> NamespaceWrite<'a> for Element<'a> {
    fn ns_write<W: std::io::Write>(
        &self,
        w: &mut W,
        aliases: Option<&AliasMap<'a>>,
    ) -> Result<(), XmlBuilderError> {
        let scope = self.scoped_aliases(aliases);
        let name = self.qualified_name(&scope)?;

        w.write_fmt(format_args!("<{name}"))?;

        for (namespace, alias) in &self.namespace_declarations {
            let url = quick_xml::escape::escape(namespace.url);
            match alias {
                Some(alias) => w.write_fmt(format_args!(" xmlns:{alias}=\"{url}\""))?,
                None => w.write_fmt(format_args!(" xmlns=\"{url}\""))?,
            }
        }

        for attribute in &self.attributes {
            attribute.ns_write(w, Some(&scope))?;
        }

        match &self.content {
            Content::None => w.write_all(b"/>")?,
            Content::Text(text) => {
                let text = quick_xml::escape::partial_escape(text.as_ref());
                w.write_fmt(format_args!(">{text}</{name}>"))?;
            }
            Content::Raw(fragment) => {
                w.write_fmt(format_args!(">{fragment}</{name}>"))?;
            }
            Content::Elements(children) => {
                w.write_all(b">")?;
                for child in children {
                    child.ns_write(w, Some(&scope))?;
                }
                w.write_fmt(format_args!("</{name}>"))?;
            }
        }
        Ok(())
    }
}
