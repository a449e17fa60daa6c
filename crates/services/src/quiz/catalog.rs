use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use quiz_core::model::ModuleId;

use super::kinds::QuizType;
use crate::error::CatalogError;

/// Section of the home screen a module is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Daily,
    Lesson,
    Word,
    Poem,
    Writing,
}

impl Category {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Category::Daily => "日积月累",
            Category::Lesson => "课文知识",
            Category::Word => "词语训练",
            Category::Poem => "古诗背诵",
            Category::Writing => "短文练笔",
        }
    }
}

/// One practice module: what it is called, how it plays, where its data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizModule {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    pub data_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub modules: Vec<QuizModule>,
}

/// Ordered list of categories and their modules. Module ids are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleCatalog {
    groups: Vec<CategoryGroup>,
}

impl ModuleCatalog {
    /// Build a catalog, rejecting duplicate module ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateModule` on the first repeated id.
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for module in groups.iter().flat_map(|g| g.modules.iter()) {
            if !seen.insert(module.id.as_str()) {
                return Err(CatalogError::DuplicateModule(module.id.to_string()));
            }
        }
        Ok(Self { groups })
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or repeats a module id.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let groups: Vec<CategoryGroup> = serde_json::from_str(json)?;
        Self::new(groups)
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }

    #[must_use]
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn modules(&self) -> impl Iterator<Item = &QuizModule> {
        self.groups.iter().flat_map(|g| g.modules.iter())
    }

    #[must_use]
    pub fn module(&self, id: &str) -> Option<&QuizModule> {
        self.modules().find(|m| m.id.as_str() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The grade-three module set the app ships with.
    #[must_use]
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        fn m(id: &str, title: &str, desc: &str, quiz_type: QuizType, data_key: &str) -> QuizModule {
            QuizModule {
                id: ModuleId::new(id),
                title: title.to_owned(),
                desc: desc.to_owned(),
                quiz_type,
                data_key: data_key.to_owned(),
            }
        }

        use QuizType as T;
        let groups = vec![
            CategoryGroup {
                category: Category::Daily,
                modules: vec![
                    m("idiom-body", "身体部位成语", "摇头晃脑、手忙脚乱...", T::IdiomComplete, "body_parts_idioms"),
                    m("idiom-number", "数字成语", "百发百中、七上八下...", T::IdiomComplete, "number_idioms"),
                    m("action-words", "动作词语", "懒洋洋、慢腾腾...", T::IdiomComplete, "action_words"),
                    m("season-words", "四季词语分类", "春暖花开、烈日炎炎...", T::WordClassify, "seasons"),
                    m("proverbs-treating", "待人名言", "不迁怒，不贰过...", T::PoemFill, "treating_people"),
                    m("proverbs-unity", "团结协作谚语", "人心齐，泰山移...", T::PoemFill, "unity"),
                    m("proverbs-perseverance", "坚韧名句", "锲而不舍，金石可镂...", T::PoemFill, "perseverance"),
                    m("mu-radical", "带\"目\"的字", "睁、眨、瞪、瞅...", T::DragFill, "mu_radical"),
                ],
            },
            CategoryGroup {
                category: Category::Lesson,
                modules: vec![
                    m("character-traits", "人物品质", "课文中的优秀人物品质", T::SentenceFill, "character_traits"),
                    m("lesson-morals", "课文道理", "课文告诉我们的道理", T::SentenceFill, "lesson_morals"),
                    m("course-knowledge", "课文知识点", "课文重点知识填空", T::ParagraphFill, "lessons"),
                ],
            },
            CategoryGroup {
                category: Category::Word,
                modules: vec![
                    m("synonyms", "近反义词配对", "翻牌记忆游戏", T::CardMatch, "units"),
                    m("polyphones", "多音字辨析", "选择正确的读音", T::Polyphone, "polyphones"),
                    m("collocations", "修饰词搭配", "词语连线练习", T::LineMatch, "units"),
                    m("word-patterns", "词语范式朗读", "AABB、ABB式词语...", T::WordRead, "patterns"),
                ],
            },
            CategoryGroup {
                category: Category::Poem,
                modules: vec![m("poems", "古诗背诵", "11首必背古诗文", T::PoemRecite, "poems")],
            },
            CategoryGroup {
                category: Category::Writing,
                modules: vec![
                    m("writing-examples", "小练笔示例", "句子仿写与段落练习", T::TextMemory, "writing_exercises"),
                    m("oral-communication", "口语交际", "场景对话练习", T::TextMemory, "oral_communication"),
                ],
            },
        ];
        Self { groups }
    }
}
