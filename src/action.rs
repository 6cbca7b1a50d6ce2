/// Central action enum: all state mutations flow through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Lifecycle
    Quit,
    Tick,
    Resize,

    // Files
    NextFile,
    PrevFile,
    RefreshDiff,

    // Diff view
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToTop,
    ScrollToBottom,
    ToggleViewMode,
    ToggleWhitespace,
    ExpandAllGaps,

    // Mouse selection, in screen cells
    MouseDown { x: u16, y: u16 },
    MouseDrag { x: u16, y: u16 },
    MouseUp { x: u16, y: u16 },
    MouseMove { x: u16, y: u16 },

    // Range comments
    ConfirmAffordance,
    ClearSelection,
    CommentChar(char),
    CommentNewline,
    CommentBackspace,
    SubmitComment,
    CancelComment,
}
